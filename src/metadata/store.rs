//! The in-memory attribute store.
//!
//! Five independent directory groups, each a map from tag number to value.
//! Reads scan the groups in priority order so a primary-image value always
//! shadows an equally named thumbnail value.

use std::collections::BTreeMap;

use tracing::warn;

use crate::error::ValueError;
use crate::format::tiff::{
    coerce, AttributeValue, DirectoryGroup, TagDescriptor, TagRegistry,
};

/// Tag number to value, iterated in ascending tag order.
pub type AttributeMap = BTreeMap<u16, AttributeValue>;

/// Typed tag values of one file, partitioned by directory group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeStore {
    groups: [AttributeMap; 5],
}

impl AttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Raw access
    // -------------------------------------------------------------------------

    /// The map backing one group.
    pub fn group(&self, group: DirectoryGroup) -> &AttributeMap {
        &self.groups[group.index()]
    }

    pub(crate) fn group_mut(&mut self, group: DirectoryGroup) -> &mut AttributeMap {
        &mut self.groups[group.index()]
    }

    /// Consume the store, yielding its maps in group order.
    pub(crate) fn into_groups(self) -> [AttributeMap; 5] {
        self.groups
    }

    pub fn is_group_empty(&self, group: DirectoryGroup) -> bool {
        self.group(group).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(BTreeMap::is_empty)
    }

    /// Entries of a group with their registry descriptors, in tag order.
    pub fn entries(
        &self,
        group: DirectoryGroup,
    ) -> impl Iterator<Item = (&'static TagDescriptor, &AttributeValue)> + '_ {
        let registry = TagRegistry::global();
        self.group(group)
            .iter()
            .filter_map(move |(&number, value)| Some((registry.by_number(group, number)?, value)))
    }

    // -------------------------------------------------------------------------
    // Typed access
    // -------------------------------------------------------------------------

    /// First value named `name`, scanning groups in priority order.
    pub fn get(&self, name: &str) -> Option<(DirectoryGroup, &AttributeValue)> {
        DirectoryGroup::ALL
            .into_iter()
            .find_map(|group| self.get_in(group, name).map(|value| (group, value)))
    }

    /// Value named `name` within one group.
    pub fn get_in(&self, group: DirectoryGroup, name: &str) -> Option<&AttributeValue> {
        let descriptor = TagRegistry::global().by_name(group, name)?;
        self.group(group).get(&descriptor.number)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn contains_in(&self, group: DirectoryGroup, name: &str) -> bool {
        self.get_in(group, name).is_some()
    }

    /// Store a typed value under a registry name.
    ///
    /// Returns `false` when the group does not define the name.
    pub fn insert(&mut self, group: DirectoryGroup, name: &str, value: AttributeValue) -> bool {
        match TagRegistry::global().by_name(group, name) {
            Some(descriptor) => {
                self.group_mut(group).insert(descriptor.number, value);
                true
            }
            None => false,
        }
    }

    /// Store a typed value only if the group has no value for the name yet.
    pub fn insert_if_absent(
        &mut self,
        group: DirectoryGroup,
        name: &str,
        value: AttributeValue,
    ) -> bool {
        !self.contains_in(group, name) && self.insert(group, name, value)
    }

    pub fn remove_in(&mut self, group: DirectoryGroup, name: &str) -> Option<AttributeValue> {
        let descriptor = TagRegistry::global().by_name(group, name)?;
        self.group_mut(group).remove(&descriptor.number)
    }

    /// Remove `name` from every group. Returns how many values were removed.
    pub fn remove(&mut self, name: &str) -> usize {
        DirectoryGroup::ALL
            .into_iter()
            .filter(|&group| self.remove_in(group, name).is_some())
            .count()
    }

    // -------------------------------------------------------------------------
    // String access
    // -------------------------------------------------------------------------

    /// The public string form of the highest-priority value named `name`.
    pub fn get_string(&self, name: &str) -> Option<String> {
        let (_, value) = self.get(name)?;
        coerce::display_value(name, value)
    }

    /// Encode `value` into every eligible group that defines `name`.
    ///
    /// The thumbnail group is eligible only when `include_thumbnail` is set
    /// or it already holds the tag. Returns the number of groups written;
    /// when no group accepts the value the last rejection is returned.
    pub fn set_string(
        &mut self,
        name: &str,
        value: &str,
        include_thumbnail: bool,
    ) -> Result<usize, ValueError> {
        let registry = TagRegistry::global();
        if !registry.is_known(name) {
            return Err(ValueError::UnknownTag(name.to_string()));
        }

        let stored = coerce::legacy_to_stored(name, value)?;

        let mut written = 0;
        let mut rejection = None;
        for group in registry.groups_defining(name) {
            if group == DirectoryGroup::Thumbnail
                && !include_thumbnail
                && !self.contains_in(group, name)
            {
                continue;
            }

            let Some(descriptor) = registry.by_name(group, name) else {
                continue;
            };

            match coerce::coerce_for_tag(descriptor, &stored) {
                Ok(typed) => {
                    self.group_mut(group).insert(descriptor.number, typed);
                    written += 1;
                }
                Err(err) => {
                    warn!(tag = name, %group, error = %err, "Rejected attribute value");
                    rejection = Some(err);
                }
            }
        }

        match rejection {
            Some(err) if written == 0 => Err(err),
            _ => Ok(written),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
