use crate::category::Category;
use crate::models::{FieldValues, Record};
use crate::store::Workbook;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Creating,
    Editing(String),
}

impl FormMode {
    /// Mode a page claims from its hidden `editing` input; blank means creating.
    pub fn from_posted(editing: Option<&str>) -> Self {
        match editing.map(str::trim) {
            Some(id) if !id.is_empty() => FormMode::Editing(id.to_string()),
            _ => FormMode::Creating,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("{category} has no field '{key}'")]
    UnknownField { category: Category, key: String },
    #[error("{0} form is not editing a record")]
    NotEditing(Category),
    #[error("{category} form changed since the page was loaded; reload and try again")]
    ModeChanged { category: Category, posted: FormMode },
}

/// What a submit did to the workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submitted {
    Created(Record),
    Updated(String),
}

/// Draft plus create/edit state for one category's entry form.
#[derive(Debug, Clone)]
pub struct FormController {
    category: Category,
    mode: FormMode,
    draft: FieldValues,
}

impl FormController {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            mode: FormMode::Creating,
            draft: blank_draft(category),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn draft(&self) -> &FieldValues {
        &self.draft
    }

    pub fn set_field(&mut self, key: &str, value: impl Into<String>) -> Result<(), FormError> {
        let field = self
            .category
            .schema()
            .field(key)
            .ok_or_else(|| FormError::UnknownField {
                category: self.category,
                key: key.to_string(),
            })?;
        self.draft.insert(field.key.to_string(), value.into());
        Ok(())
    }

    /// Fails without touching the draft when the page posted against a
    /// different create/edit state than the one held here.
    pub fn expect_mode(&self, posted: FormMode) -> Result<(), FormError> {
        if posted == self.mode {
            return Ok(());
        }
        Err(FormError::ModeChanged {
            category: self.category,
            posted,
        })
    }

    /// Applies every value or none of them.
    pub fn fill<I>(&mut self, values: I) -> Result<(), FormError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let values: Vec<(String, String)> = values.into_iter().collect();
        let schema = self.category.schema();
        if let Some(key) = schema.unknown_key(values.iter().map(|(key, _)| key.as_str())) {
            return Err(FormError::UnknownField {
                category: self.category,
                key: key.to_string(),
            });
        }
        self.draft.extend(values);
        Ok(())
    }

    pub fn edit(&mut self, record: &Record) {
        self.draft = blank_draft(self.category);
        for (key, value) in &record.fields {
            if self.category.schema().field(key).is_some() {
                self.draft.insert(key.clone(), value.clone());
            }
        }
        self.mode = FormMode::Editing(record.id.clone());
    }

    pub fn submit(&mut self, workbook: &mut Workbook) -> Submitted {
        let mode = std::mem::replace(&mut self.mode, FormMode::Creating);
        let draft = std::mem::replace(&mut self.draft, blank_draft(self.category));
        match mode {
            FormMode::Creating => Submitted::Created(workbook.add(self.category, &draft)),
            FormMode::Editing(id) => {
                workbook.update(self.category, &id, &draft);
                Submitted::Updated(id)
            }
        }
    }

    pub fn cancel(&mut self) -> Result<(), FormError> {
        if self.mode == FormMode::Creating {
            return Err(FormError::NotEditing(self.category));
        }
        self.reset();
        Ok(())
    }

    /// Drops an edit whose target record no longer exists.
    pub fn forget(&mut self, id: &str) {
        if matches!(&self.mode, FormMode::Editing(editing) if editing == id) {
            debug!(category = %self.category, id, "edit target deleted, resetting form");
            self.reset();
        }
    }

    fn reset(&mut self) {
        self.mode = FormMode::Creating;
        self.draft = blank_draft(self.category);
    }
}

fn blank_draft(category: Category) -> FieldValues {
    category
        .schema()
        .fields
        .iter()
        .map(|field| (field.key.to_string(), field.default.to_string()))
        .collect()
}

/// One form controller per category.
#[derive(Debug, Clone)]
pub struct FormBoard {
    forms: Vec<FormController>,
}

impl Default for FormBoard {
    fn default() -> Self {
        Self {
            forms: Category::ALL.into_iter().map(FormController::new).collect(),
        }
    }
}

impl FormBoard {
    pub fn get(&self, category: Category) -> &FormController {
        &self.forms[index_of(category)]
    }

    pub fn get_mut(&mut self, category: Category) -> &mut FormController {
        &mut self.forms[index_of(category)]
    }
}

fn index_of(category: Category) -> usize {
    Category::ALL
        .iter()
        .position(|candidate| *candidate == category)
        .unwrap_or_default()
}
