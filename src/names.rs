use std::collections::{HashMap, HashSet};
use std::iter;

/// Resolved names and the audio ids they stand for, in insertion order.
///
/// Keys are unique. A name that is inserted twice is disambiguated with numeric suffixes, and the
/// numbering depends on the order in which names were inserted:
///
/// - If the most recent key that shares the name's stem ends in a number, the new entry takes the
///   next number.
/// - Otherwise the existing entry is renamed to `name_0` and the new entry is inserted as `name_1`.
///
/// ```
/// use wwnames::NameMap;
///
/// let mut names = NameMap::new();
/// names.insert("boss_fight", 1);
/// names.insert("boss_fight", 2);
///
/// assert_eq!(names.get("boss_fight_0"), Some(1));
/// assert_eq!(names.get("boss_fight_1"), Some(2));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NameMap {
    entries: Vec<(String, u32)>,
    index: HashMap<String, usize>,
}

impl NameMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a name for an audio id, disambiguating it if the name is already taken.
    pub fn insert(&mut self, name: impl Into<String>, audio_id: u32) {
        let mut name = name.into();

        if self.index.contains_key(&name) {
            name = self.disambiguate(name);
        }

        if self.index.contains_key(&name) {
            let free = self.first_free(&name);
            log::warn!("disambiguated name {name} was already taken; using {free} instead");
            name = free;
        }

        self.index.extend(iter::once((name.clone(), self.entries.len())));
        self.entries.push((name, audio_id));
    }

    fn disambiguate(&mut self, name: String) -> String {
        if let Some(next) = self.next_numbered(&name) {
            return next;
        }

        let renamed = format!("{name}_0");

        if self.index.contains_key(&renamed) {
            log::warn!("can't rename {name} to {renamed}, which is already taken");
        } else {
            self.rename(&name, renamed);
        }

        format!("{name}_1")
    }

    // Looks for the latest key with the same number of segments and the same leading segments. If
    // its last segment is a number, the name after it is returned.
    //
    // The number is cut out of that key by the length of its canonical form, so a key like `x_07`
    // gives `x_78` rather than `x_8`.
    fn next_numbered(&self, name: &str) -> Option<String> {
        let underscores = name.matches('_').count();
        let stem_len = name.rfind('_').map_or(0, |i| i + 1);
        let stem = &name[..stem_len];

        let latest = self
            .entries
            .iter()
            .rev()
            .map(|(key, _)| key)
            .find(|key| key.matches('_').count() == underscores && key.starts_with(stem))?;

        let last_index: i32 = latest[stem_len..].parse().ok()?;
        let next = last_index.checked_add(1)?;
        let digits = last_index
            .to_string()
            .chars()
            .filter(char::is_ascii_digit)
            .count();

        let mut next_name = latest.clone();
        next_name.replace_range(stem_len..stem_len + digits, "");
        next_name.push_str(&next.to_string());

        Some(next_name)
    }

    fn first_free(&self, name: &str) -> String {
        let (stem, mut counter) = match name.rsplit_once('_') {
            Some((stem, last)) => match last.parse::<u64>() {
                Ok(n) => (stem, n.saturating_add(1)),
                Err(_) => (name, 1),
            },
            None => (name, 1),
        };

        loop {
            let candidate = format!("{stem}_{counter}");
            if !self.index.contains_key(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }

    fn rename(&mut self, from: &str, to: String) {
        if let Some(position) = self.index.remove(from) {
            self.entries[position].0.clone_from(&to);
            self.index.extend(iter::once((to, position)));
        }
    }

    /// Returns the audio id stored under a name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<u32> {
        self.index.get(name).map(|&position| self.entries[position].1)
    }

    /// Returns the first name inserted for an audio id that is still in the map.
    #[must_use]
    pub fn name_for(&self, audio_id: u32) -> Option<&str> {
        self.entries
            .iter()
            .find(|&&(_, id)| id == audio_id)
            .map(|(name, _)| name.as_str())
    }

    /// Returns the ids, out of `ids`, that have no name in the map. Order is preserved.
    pub fn unresolved<I: IntoIterator<Item = u32>>(&self, ids: I) -> Vec<u32> {
        let named: HashSet<u32> = self.entries.iter().map(|&(_, id)| id).collect();
        ids.into_iter().filter(|id| !named.contains(id)).collect()
    }

    /// Returns the number of names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map holds no names.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns every name and its audio id, in insertion order.
    ///
    /// A renamed entry keeps the position of the name it replaced.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(name, id)| (name.as_str(), *id))
    }
}
