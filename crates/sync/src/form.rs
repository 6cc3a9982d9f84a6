//! Create/edit modal state.
//!
//! `Closed -> Create | Edit(id) -> (submit ok) -> Closed`. A failed submit
//! keeps the modal open with the user's inputs intact. The in-flight flag is
//! the only concurrency guard: a second submit while one is pending is
//! ignored.

use std::marker::PhantomData;

use admindash_core::{Entity, FieldKind, FieldValue, Fields, RecordId, Stored};
use admindash_gateway::CollectionGateway;

use crate::controller::SyncController;
use crate::error::SyncError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormMode {
    #[default]
    Closed,
    Create,
    Edit(RecordId),
}

/// What a submit will send.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Create(Fields),
    Update(RecordId, Fields),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(RecordId),
    Updated(RecordId),
    /// Closed form, or a submit already in flight.
    Ignored,
}

#[derive(Debug)]
pub struct FormController<E> {
    mode: FormMode,
    inputs: Fields,
    in_flight: bool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Default for FormController<E> {
    fn default() -> Self {
        Self {
            mode: FormMode::Closed,
            inputs: Fields::new(),
            in_flight: false,
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> FormController<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn is_open(&self) -> bool {
        self.mode != FormMode::Closed
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn inputs(&self) -> &Fields {
        &self.inputs
    }

    /// Open the create modal with empty text inputs for the user-entered
    /// fields. Generated fields (defaults) are left out.
    pub fn open_create(&mut self) {
        self.mode = FormMode::Create;
        self.in_flight = false;
        self.inputs = E::SCHEMA
            .iter()
            .filter(|spec| spec.input && matches!(spec.kind, FieldKind::Text | FieldKind::Url))
            .map(|spec| (spec.name.to_string(), FieldValue::text("")))
            .collect();
    }

    /// Open the edit modal pre-filled from the view model's copy of the row.
    pub fn open_edit(&mut self, row: &Stored<E>) {
        let current = row.data.to_fields();
        self.mode = FormMode::Edit(row.id.clone());
        self.in_flight = false;
        self.inputs = E::SCHEMA
            .iter()
            .filter(|spec| spec.editable)
            .filter_map(|spec| {
                current
                    .get(spec.name)
                    .map(|value| (spec.name.to_string(), value.clone()))
            })
            .collect();
    }

    /// Set an input. Returns `false` if the form is closed or the field is
    /// not one this modal shows.
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) -> bool {
        if !self.accepts_input(name) {
            return false;
        }
        self.inputs.insert(name, value);
        true
    }

    pub fn set_text(&mut self, name: &str, text: impl Into<String>) -> bool {
        self.set(name, FieldValue::text(text))
    }

    pub fn cancel(&mut self) {
        self.mode = FormMode::Closed;
        self.inputs = Fields::new();
        self.in_flight = false;
    }

    /// Mark the form in flight and hand out what to send. `None` when closed
    /// or already submitting.
    pub fn begin_submit(&mut self) -> Option<Submission> {
        if self.in_flight {
            tracing::debug!(collection = E::COLLECTION, "submit ignored; one already in flight");
            return None;
        }
        let submission = match &self.mode {
            FormMode::Closed => return None,
            FormMode::Create => Submission::Create(self.inputs.clone()),
            FormMode::Edit(id) => Submission::Update(id.clone(), self.inputs.clone()),
        };
        self.in_flight = true;
        Some(submission)
    }

    /// Close on success; stay open with inputs intact on failure.
    pub fn finish_submit(&mut self, ok: bool) {
        self.in_flight = false;
        if ok {
            self.cancel();
        }
    }

    /// Send the form through `sync`.
    pub async fn submit<G>(&mut self, sync: &mut SyncController<E, G>) -> Result<SubmitOutcome, SyncError>
    where
        G: CollectionGateway + ?Sized,
    {
        let Some(submission) = self.begin_submit() else {
            return Ok(SubmitOutcome::Ignored);
        };
        let result = match submission {
            Submission::Create(fields) => sync.create(fields).await.map(SubmitOutcome::Created),
            Submission::Update(id, fields) => sync
                .update(&id, fields)
                .await
                .map(|()| SubmitOutcome::Updated(id)),
        };
        self.finish_submit(result.is_ok());
        result
    }

    fn accepts_input(&self, name: &str) -> bool {
        let Some(spec) = E::SCHEMA.iter().find(|spec| spec.name == name) else {
            return false;
        };
        match self.mode {
            FormMode::Closed => false,
            FormMode::Create => spec.input,
            FormMode::Edit(_) => spec.editable,
        }
    }
}
