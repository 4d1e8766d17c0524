use std::collections::HashMap;

/// Whether a group is a switch group or a state group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GroupKind {
    /// Switch group: a value set per game object.
    Switch,
    /// State group: a value set globally.
    State,
}

/// A named value of a switch or state group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    /// Id of the element, as referenced by path trees.
    pub id: u32,
    /// Name of the element.
    pub name: String,
}

/// A named switch or state group and its ordered elements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementGroup {
    /// Id of the group, as referenced by switch containers.
    pub id: u32,
    /// Name of the group.
    pub name: String,
    /// Elements of the group, in declaration order.
    pub elements: Vec<Element>,
}

/// Switch and state names used to label the branches of switch containers.
#[derive(Clone, Debug, Default)]
pub struct Vocabulary {
    switch_groups: Vec<ElementGroup>,
    state_groups: Vec<ElementGroup>,
    index: HashMap<u32, (GroupKind, usize, usize)>,
}

impl Vocabulary {
    /// Creates a vocabulary from switch groups and state groups.
    ///
    /// An element id is looked up in switch groups before state groups; if an id appears more than
    /// once, the first occurrence in that order is used.
    #[must_use]
    pub fn new(switch_groups: Vec<ElementGroup>, state_groups: Vec<ElementGroup>) -> Self {
        // later entries overwrite earlier ones when collected, so walk backwards
        let index = [
            (GroupKind::Switch, &switch_groups),
            (GroupKind::State, &state_groups),
        ]
        .into_iter()
        .flat_map(|(kind, groups)| {
            groups.iter().enumerate().flat_map(move |(group_index, group)| {
                group
                    .elements
                    .iter()
                    .enumerate()
                    .map(move |(element_index, element)| {
                        (element.id, (kind, group_index, element_index))
                    })
            })
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

        Self {
            switch_groups,
            state_groups,
            index,
        }
    }

    /// Returns the element with the given id, along with the kind of its owning group.
    #[must_use]
    pub fn element(&self, id: u32) -> Option<(GroupKind, &Element)> {
        let &(kind, group, element) = self.index.get(&id)?;
        let groups = match kind {
            GroupKind::Switch => &self.switch_groups,
            GroupKind::State => &self.state_groups,
        };

        Some((kind, &groups[group].elements[element]))
    }

    /// Returns the name of the element with the given id.
    #[must_use]
    pub fn element_name(&self, id: u32) -> Option<&str> {
        self.element(id).map(|(_, element)| element.name.as_str())
    }

    /// Returns the switch groups.
    #[must_use]
    pub fn switch_groups(&self) -> &[ElementGroup] {
        &self.switch_groups
    }

    /// Returns the state groups.
    #[must_use]
    pub fn state_groups(&self) -> &[ElementGroup] {
        &self.state_groups
    }
}
