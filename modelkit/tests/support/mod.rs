#![allow(dead_code)]

use modelkit::{
    memory::MemoryStore,
    model::{FieldElement, FieldViolation, Model},
    repository::Repository,
    resources::FieldAccessor,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sibling {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

impl FieldElement for Sibling {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn assign_id(&mut self, id: String) {
        self.id = Some(id);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dummy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub revision: u64,
    #[serde(default)]
    pub index: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub siblings: Option<Vec<Sibling>>,
}

impl Model for Dummy {
    fn model_name() -> &'static str {
        "dummy"
    }

    fn collection_name() -> &'static str {
        "dummies"
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn set_revision(&mut self, revision: u64) {
        self.revision = revision;
    }

    fn validate(&self) -> Result<(), FieldViolation> {
        if self.name.trim().is_empty() {
            return Err(FieldViolation::new("name", "name must not be blank"));
        }

        if let Some(siblings) = &self.siblings {
            for (i, sibling) in siblings.iter().enumerate() {
                if sibling.name.trim().is_empty() {
                    return Err(FieldViolation::new(
                        format!("siblings[{i}].name"),
                        "sibling name must not be blank",
                    ));
                }
            }
        }

        Ok(())
    }
}

pub struct SiblingsAccessor;

impl FieldAccessor<Dummy> for SiblingsAccessor {
    type Element = Sibling;

    fn get(&self, model: &Dummy) -> Option<Vec<Sibling>> {
        model.siblings.clone()
    }

    fn set(&self, model: &mut Dummy, elements: Option<Vec<Sibling>>) {
        model.siblings = elements;
    }
}

/// A model whose validation constrains the list itself: a team that has a
/// member list must keep at least one entry in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub revision: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<Sibling>>,
}

impl Model for Team {
    fn model_name() -> &'static str {
        "team"
    }

    fn collection_name() -> &'static str {
        "teams"
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn set_revision(&mut self, revision: u64) {
        self.revision = revision;
    }

    fn validate(&self) -> Result<(), FieldViolation> {
        if matches!(&self.members, Some(members) if members.is_empty()) {
            return Err(FieldViolation::new("members", "a team must keep at least one member"));
        }

        Ok(())
    }
}

pub struct MembersAccessor;

impl FieldAccessor<Team> for MembersAccessor {
    type Element = Sibling;

    fn get(&self, model: &Team) -> Option<Vec<Sibling>> {
        model.members.clone()
    }

    fn set(&self, model: &mut Team, elements: Option<Vec<Sibling>>) {
        model.members = elements;
    }
}

pub const SCHEMA_VERSION: &str = "v2";

pub fn repository() -> Repository<MemoryStore> {
    Repository::new(MemoryStore::new(), SCHEMA_VERSION)
}

pub fn dummy(name: &str, index: i64) -> Dummy {
    Dummy { id: None, revision: 0, index, name: name.to_string(), siblings: None }
}
