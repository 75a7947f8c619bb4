// src/models/entry.rs

//! Project, distribution, version and file entries of the portal hierarchy.
//!
//! The hierarchy is encoded in the types: a [`Project`] holds
//! [`Distribution`]s, a [`Distribution`] holds [`Version`]s and a
//! [`Version`] holds [`File`]s. Every level implements [`Node`], which
//! carries the traversal, filtering and serialization shared by all of them.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::models::{FileDetails, Link, Pattern, Size};

/// Timestamp format used for `upload-time` in exports.
pub const UPLOAD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Level of an entry in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Project,
    Distribution,
    Version,
    File,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Project => "project",
            Level::Distribution => "distribution",
            Level::Version => "version",
            Level::File => "file",
        };
        f.write_str(name)
    }
}

/// Behavior shared by every level of the hierarchy.
pub trait Node: Clone + Serialize {
    const LEVEL: Level;

    /// Link the entry was created from.
    fn link(&self) -> &Link;

    /// Portal id taken from the link's query parameters.
    fn id(&self) -> u64;

    fn description(&self) -> &str {
        &self.link().description
    }

    /// Copy of this entry whose descendants match `patterns`, outermost level first.
    ///
    /// With no patterns the entry is returned unchanged. Otherwise the copy
    /// is kept only if at least one child survives.
    fn filter(&self, patterns: &[Pattern]) -> Option<Self>;
}

/// An entry that owns children of the next level down.
#[derive(Debug, Clone)]
pub struct Entry<C> {
    link: Arc<Link>,
    id: u64,
    children: Vec<C>,
}

/// Top level of the hierarchy.
pub type Project = Entry<Distribution>;

/// A distribution within a project.
pub type Distribution = Entry<Version>;

/// A version of a distribution.
pub type Version = Entry<File>;

impl<C: Node> Entry<C> {
    pub fn new(link: Link, id: u64, children: Vec<C>) -> Self {
        Self {
            link: Arc::new(link),
            id,
            children,
        }
    }

    pub fn children(&self) -> &[C] {
        &self.children
    }

    pub fn set_children(&mut self, children: Vec<C>) {
        self.children = children;
    }
}

impl Project {
    pub fn distributions(&self) -> &[Distribution] {
        &self.children
    }
}

impl Distribution {
    pub fn versions(&self) -> &[Version] {
        &self.children
    }
}

impl Version {
    pub fn files(&self) -> &[File] {
        &self.children
    }
}

/// Implemented by every type that appears as children of an [`Entry`].
pub trait ParentLevel {
    /// Level of the entry that holds children of this type.
    const LEVEL: Level;

    /// Key under which a list of this type is exported.
    const COLLECTION_KEY: &'static str;
}

impl ParentLevel for Distribution {
    const LEVEL: Level = Level::Project;
    const COLLECTION_KEY: &'static str = "distributions";
}

impl ParentLevel for Version {
    const LEVEL: Level = Level::Distribution;
    const COLLECTION_KEY: &'static str = "versions";
}

impl ParentLevel for File {
    const LEVEL: Level = Level::Version;
    const COLLECTION_KEY: &'static str = "files";
}

impl<C> Node for Entry<C>
where
    C: Node + ParentLevel,
{
    const LEVEL: Level = <C as ParentLevel>::LEVEL;

    fn link(&self) -> &Link {
        &self.link
    }

    fn id(&self) -> u64 {
        self.id
    }

    fn filter(&self, patterns: &[Pattern]) -> Option<Self> {
        let Some((pattern, rest)) = patterns.split_first() else {
            return Some(self.clone());
        };

        let children: Vec<C> = self
            .children
            .iter()
            .filter(|child| pattern.is_match(child.description()))
            .filter_map(|child| {
                if rest.is_empty() {
                    Some(child.clone())
                } else {
                    child.filter(rest)
                }
            })
            .collect();

        if children.is_empty() {
            return None;
        }

        Some(Self {
            link: Arc::clone(&self.link),
            id: self.id,
            children,
        })
    }
}

impl<C> Serialize for Entry<C>
where
    C: Node + ParentLevel,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.children.is_empty() { 3 } else { 4 };
        let mut map = serializer.serialize_map(Some(len))?;

        map.serialize_entry("description", self.description())?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("url", self.link.url.as_str())?;
        if !self.children.is_empty() {
            map.serialize_entry(C::COLLECTION_KEY, &self.children)?;
        }

        map.end()
    }
}

/// A downloadable file, the leaf level of the hierarchy.
#[derive(Debug, Clone)]
pub struct File {
    link: Arc<Link>,
    id: u64,
    details: FileDetails,
}

impl File {
    pub fn new(link: Link, id: u64, details: FileDetails) -> Self {
        Self {
            link: Arc::new(link),
            id,
            details,
        }
    }

    pub fn upload_time(&self) -> Option<NaiveDateTime> {
        self.details.upload_time
    }

    pub fn size(&self) -> Option<Size> {
        self.details.size
    }
}

impl Node for File {
    const LEVEL: Level = Level::File;

    fn link(&self) -> &Link {
        &self.link
    }

    fn id(&self) -> u64 {
        self.id
    }

    fn filter(&self, patterns: &[Pattern]) -> Option<Self> {
        // Files have no children, so any remaining pattern rejects them.
        patterns.is_empty().then(|| self.clone())
    }
}

impl Serialize for File {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let size = self
            .details
            .size
            .filter(|size| size.unit.suffix().is_some());
        let len = 3 + usize::from(self.details.upload_time.is_some()) + usize::from(size.is_some());
        let mut map = serializer.serialize_map(Some(len))?;

        map.serialize_entry("description", self.description())?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("url", self.link.url.as_str())?;
        if let Some(upload_time) = self.details.upload_time {
            map.serialize_entry(
                "upload-time",
                &upload_time.format(UPLOAD_TIME_FORMAT).to_string(),
            )?;
        }
        if let Some(size) = size {
            map.serialize_entry("size", &size.to_string())?;
        }

        map.end()
    }
}

/// Keep the first entry per id, preserving order.
pub fn dedup_by_id<T: Node>(entries: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.id()))
        .collect()
}
