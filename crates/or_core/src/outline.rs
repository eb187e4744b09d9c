//! Editing operations on a recommended outline.
//!
//! Every operation keeps two invariants: heading ids are unique across the
//! whole outline, and nesting is at most one level deep (H3 under H2).

use std::collections::HashSet;
use crate::types::{OutlineHeading, OutlineLevel};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Top(usize),
    Child(usize, usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outline {
    headings: Vec<OutlineHeading>,
}

impl Outline {
    pub fn new(headings: Vec<OutlineHeading>) -> Result<Self> {
        validate(&headings)?;
        Ok(Self { headings })
    }

    /// Re-checks id uniqueness and one-level nesting.
    pub fn validate(&self) -> Result<()> {
        validate(&self.headings)
    }

    pub fn headings(&self) -> &[OutlineHeading] {
        &self.headings
    }

    pub fn into_headings(self) -> Vec<OutlineHeading> {
        self.headings
    }

    pub fn get(&self, id: &str) -> Option<&OutlineHeading> {
        match self.locate(id)? {
            Position::Top(i) => self.headings.get(i),
            Position::Child(p, c) => self.headings[p].children().get(c),
        }
    }

    pub fn rename(&mut self, id: &str, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::Outline("heading text cannot be empty".to_string()));
        }
        let heading = self.heading_mut(id)?;
        heading.text = text.to_string();
        Ok(())
    }

    /// Removes a heading along with any children it has.
    pub fn remove(&mut self, id: &str) -> Result<OutlineHeading> {
        match self.position(id)? {
            Position::Top(i) => Ok(self.headings.remove(i)),
            Position::Child(p, c) => Ok(take_child(&mut self.headings[p], c)),
        }
    }

    /// Moves a heading to `index` among its siblings. Out-of-range indexes
    /// move it to the end.
    pub fn move_to(&mut self, id: &str, index: usize) -> Result<()> {
        match self.position(id)? {
            Position::Top(i) => {
                let heading = self.headings.remove(i);
                let index = index.min(self.headings.len());
                self.headings.insert(index, heading);
            }
            Position::Child(p, c) => {
                let children = self.headings[p].children.get_or_insert_with(Vec::new);
                let heading = children.remove(c);
                let index = index.min(children.len());
                children.insert(index, heading);
            }
        }
        Ok(())
    }

    /// Turns an H3 into an H2 placed right after its former parent.
    pub fn promote(&mut self, id: &str) -> Result<()> {
        let (p, c) = match self.position(id)? {
            Position::Child(p, c) => (p, c),
            Position::Top(_) => {
                return Err(Error::Outline(format!("heading {} is already top-level", id)));
            }
        };
        let mut heading = take_child(&mut self.headings[p], c);
        heading.level = OutlineLevel::H2;
        self.headings.insert(p + 1, heading);
        Ok(())
    }

    /// Turns a top-level heading into an H3 under the previous H2. Its own
    /// children follow it into that parent so nesting stays one level deep.
    pub fn demote(&mut self, id: &str) -> Result<()> {
        let i = match self.position(id)? {
            Position::Top(i) => i,
            Position::Child(_, _) => {
                return Err(Error::Outline(format!("heading {} is already nested", id)));
            }
        };
        if i == 0 || self.headings[i - 1].level != OutlineLevel::H2 {
            return Err(Error::Outline(format!("heading {} has no preceding H2 to nest under", id)));
        }

        let mut heading = self.headings.remove(i);
        let orphans = heading.children.take().unwrap_or_default();
        heading.level = OutlineLevel::H3;

        let parent = self.headings[i - 1].children.get_or_insert_with(Vec::new);
        parent.push(heading);
        parent.extend(orphans);
        Ok(())
    }

    /// Appends a heading, at the top level or under the H2 `parent`, and returns its id.
    pub fn add(&mut self, parent: Option<&str>, text: &str) -> Result<String> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::Outline("heading text cannot be empty".to_string()));
        }
        let id = self.fresh_id();

        match parent {
            None => self.headings.push(OutlineHeading {
                id: id.clone(),
                level: OutlineLevel::H2,
                text: text.to_string(),
                children: None,
            }),
            Some(parent_id) => {
                let p = match self.position(parent_id)? {
                    Position::Top(p) if self.headings[p].level == OutlineLevel::H2 => p,
                    _ => {
                        return Err(Error::Outline(format!(
                            "heading {} cannot have children",
                            parent_id
                        )))
                    }
                };
                self.headings[p]
                    .children
                    .get_or_insert_with(Vec::new)
                    .push(OutlineHeading {
                        id: id.clone(),
                        level: OutlineLevel::H3,
                        text: text.to_string(),
                        children: None,
                    });
            }
        }
        Ok(id)
    }

    fn locate(&self, id: &str) -> Option<Position> {
        for (i, heading) in self.headings.iter().enumerate() {
            if heading.id == id {
                return Some(Position::Top(i));
            }
            if let Some(c) = heading.children().iter().position(|child| child.id == id) {
                return Some(Position::Child(i, c));
            }
        }
        None
    }

    fn position(&self, id: &str) -> Result<Position> {
        self.locate(id)
            .ok_or_else(|| Error::Outline(format!("unknown heading id: {}", id)))
    }

    fn heading_mut(&mut self, id: &str) -> Result<&mut OutlineHeading> {
        match self.position(id)? {
            Position::Top(i) => Ok(&mut self.headings[i]),
            Position::Child(p, c) => Ok(&mut self.headings[p].children.get_or_insert_with(Vec::new)[c]),
        }
    }

    fn fresh_id(&self) -> String {
        let taken: HashSet<&str> = self
            .headings
            .iter()
            .flat_map(|h| std::iter::once(h.id.as_str()).chain(h.children().iter().map(|c| c.id.as_str())))
            .collect();
        (1..)
            .map(|n| format!("heading-{}", n))
            .find(|candidate| !taken.contains(candidate.as_str()))
            .unwrap_or_default()
    }
}

fn take_child(parent: &mut OutlineHeading, index: usize) -> OutlineHeading {
    let children = parent.children.get_or_insert_with(Vec::new);
    let child = children.remove(index);
    if children.is_empty() {
        parent.children = None;
    }
    child
}

/// Checks id uniqueness and one-level nesting.
pub fn validate(headings: &[OutlineHeading]) -> Result<()> {
    let mut seen = HashSet::new();
    for heading in headings {
        if !seen.insert(heading.id.as_str()) {
            return Err(Error::Outline(format!("duplicate heading id: {}", heading.id)));
        }
        if heading.level == OutlineLevel::H3 && !heading.children().is_empty() {
            return Err(Error::Outline(format!("H3 heading {} cannot have children", heading.id)));
        }
        for child in heading.children() {
            if child.level != OutlineLevel::H3 {
                return Err(Error::Outline(format!("nested heading {} must be H3", child.id)));
            }
            if !child.children().is_empty() {
                return Err(Error::Outline(format!("heading {} nests deeper than one level", child.id)));
            }
            if !seen.insert(child.id.as_str()) {
                return Err(Error::Outline(format!("duplicate heading id: {}", child.id)));
            }
        }
    }
    Ok(())
}
