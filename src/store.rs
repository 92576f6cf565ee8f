use crate::category::Category;
use crate::models::{FieldValues, Record};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

/// The ten record collections, in insertion order, plus a revision bumped
/// on every effective mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Workbook {
    pub revision: u64,
    careers: Vec<Record>,
    communities: Vec<Record>,
    projects: Vec<Record>,
    overseas: Vec<Record>,
    educations: Vec<Record>,
    awards: Vec<Record>,
    languages: Vec<Record>,
    foreign_languages: Vec<Record>,
    certifications: Vec<Record>,
    it_skills: Vec<Record>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("workbook is at revision {current}, request expected {expected}")]
pub struct StaleRevision {
    pub expected: u64,
    pub current: u64,
}

impl Workbook {
    pub fn records(&self, category: Category) -> &[Record] {
        match category {
            Category::Careers => &self.careers,
            Category::Communities => &self.communities,
            Category::Projects => &self.projects,
            Category::Overseas => &self.overseas,
            Category::Educations => &self.educations,
            Category::Awards => &self.awards,
            Category::Languages => &self.languages,
            Category::ForeignLanguages => &self.foreign_languages,
            Category::Certifications => &self.certifications,
            Category::ItSkills => &self.it_skills,
        }
    }

    fn records_mut(&mut self, category: Category) -> &mut Vec<Record> {
        match category {
            Category::Careers => &mut self.careers,
            Category::Communities => &mut self.communities,
            Category::Projects => &mut self.projects,
            Category::Overseas => &mut self.overseas,
            Category::Educations => &mut self.educations,
            Category::Awards => &mut self.awards,
            Category::Languages => &mut self.languages,
            Category::ForeignLanguages => &mut self.foreign_languages,
            Category::Certifications => &mut self.certifications,
            Category::ItSkills => &mut self.it_skills,
        }
    }

    pub fn find(&self, category: Category, id: &str) -> Option<&Record> {
        self.records(category).iter().find(|record| record.id == id)
    }

    /// Total number of records across every category.
    pub fn len(&self) -> usize {
        Category::ALL
            .into_iter()
            .map(|category| self.records(category).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn check_revision(&self, expected: Option<u64>) -> Result<(), StaleRevision> {
        match expected {
            Some(expected) if expected != self.revision => Err(StaleRevision {
                expected,
                current: self.revision,
            }),
            _ => Ok(()),
        }
    }

    /// Appends a record built from `fields`. Schema fields missing from
    /// `fields` are stored blank; keys outside the schema are dropped.
    pub fn add(&mut self, category: Category, fields: &FieldValues) -> Record {
        let schema = category.schema();
        let record = Record {
            id: next_id(self.records(category)),
            fields: schema
                .fields
                .iter()
                .map(|field| {
                    let value = fields.get(field.key).cloned().unwrap_or_default();
                    (field.key.to_string(), value)
                })
                .collect(),
        };

        self.records_mut(category).push(record.clone());
        self.revision = self.revision.saturating_add(1);
        info!(%category, id = %record.id, "record added");
        record
    }

    /// Replaces the supplied schema fields of record `id`. Returns whether a
    /// record matched; an unknown id leaves the workbook untouched.
    pub fn update(&mut self, category: Category, id: &str, partial: &FieldValues) -> bool {
        let schema = category.schema();
        let Some(record) = self
            .records_mut(category)
            .iter_mut()
            .find(|record| record.id == id)
        else {
            debug!(%category, id, "ignoring update for unknown record");
            return false;
        };

        for (key, value) in partial {
            if let Some(field) = schema.field(key) {
                record.fields.insert(field.key.to_string(), value.clone());
            }
        }
        self.revision = self.revision.saturating_add(1);
        info!(%category, id, "record updated");
        true
    }

    pub fn delete(&mut self, category: Category, id: &str) -> bool {
        let records = self.records_mut(category);
        let before = records.len();
        records.retain(|record| record.id != id);
        if records.len() == before {
            debug!(%category, id, "ignoring delete for unknown record");
            return false;
        }

        self.revision = self.revision.saturating_add(1);
        info!(%category, id, "record deleted");
        true
    }
}

/// Millisecond timestamp plus a random suffix, redrawn on collision.
fn next_id(existing: &[Record]) -> String {
    loop {
        let suffix = Uuid::new_v4().simple().to_string();
        let id = format!("{}-{}", Utc::now().timestamp_millis(), &suffix[..8]);
        if existing.iter().all(|record| record.id != id) {
            return id;
        }
    }
}
