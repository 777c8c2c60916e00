use indexmap::IndexMap;

/// Records that are nested under a tournament event when displayed.
pub trait EventRecord {
    fn event_name(&self) -> &str;
}

/// Event name -> records, in order of first appearance.
pub type EventGroups<'a, T> = IndexMap<&'a str, Vec<&'a T>>;

/// Partition records by event name in a single pass.
///
/// Group order follows the first appearance of each event; records keep their
/// relative order inside a group.
pub fn group_by_event<'a, T, I>(records: I) -> EventGroups<'a, T>
where
    T: EventRecord + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut groups: EventGroups<'a, T> = IndexMap::new();
    for record in records {
        groups.entry(record.event_name()).or_default().push(record);
    }
    groups
}
