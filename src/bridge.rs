//! Command bridge between the options window and the builder
//!
//! The window posts typed commands as JSON:
//!
//! ```json
//! {"type": "submit", "payload": "{\"rowCount\": \"2\", \"colCount\": \"3\"}"}
//! {"type": "cancel"}
//! {"type": "resize", "payload": 512}
//! ```
//!
//! A [`Dispatcher`] owns the document and the library for the lifetime of
//! one window and turns each command into an [`Outcome`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::core::builder::{build_table, BuildOutput};
use crate::core::edit::{edit_options, edit_table, find_table, stored_options};
use crate::core::options::{normalize_with, validate, Mode, Options, RawOptions};
use crate::data::constants::WINDOW_WIDTH;
use crate::host::{HostDocument, NodeId};
use crate::library::LibraryResolver;
use crate::utils::error::{TableError, TableResult, ValidationError};

/// Wire shape of a command
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    payload: Value,
}

/// Inbound command from the options window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Envelope", into = "Envelope")]
pub enum Command {
    /// Build or edit a table from the posted fields
    Submit { fields: RawOptions },
    /// Close the window without touching the document
    Cancel,
    /// Resize the window to a new height
    Resize { height: f64 },
}

impl Command {
    pub fn from_json(input: &str) -> TableResult<Self> {
        serde_json::from_str(input).map_err(|e| TableError::Protocol(e.to_string()))
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

fn payload_height(payload: &Value) -> Result<f64, String> {
    let height = match payload {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    match height {
        Some(h) if h.is_finite() && h > 0.0 => Ok(h),
        _ => Err(format!("invalid window height {}", payload)),
    }
}

impl TryFrom<Envelope> for Command {
    type Error = String;

    fn try_from(envelope: Envelope) -> Result<Self, Self::Error> {
        match envelope.kind.as_str() {
            "submit" => RawOptions::from_value(envelope.payload)
                .map(|fields| Command::Submit { fields })
                .map_err(|e| e.to_string()),
            "cancel" => Ok(Command::Cancel),
            "resize" => payload_height(&envelope.payload).map(|height| Command::Resize { height }),
            other => Err(format!("unknown command '{}'", other)),
        }
    }
}

impl From<Command> for Envelope {
    fn from(command: Command) -> Self {
        let (kind, payload) = match command {
            Command::Submit { fields } => {
                ("submit", serde_json::to_value(fields).unwrap_or_default())
            }
            Command::Cancel => ("cancel", Value::Null),
            Command::Resize { height } => ("resize", Value::from(height)),
        };
        Envelope {
            kind: kind.to_string(),
            payload,
        }
    }
}

/// Outbound event answering one command
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Outcome {
    Built(BuildOutput),
    Edited(BuildOutput),
    Cancelled,
    Resized { width: f64, height: f64 },
    Failed { message: String },
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

/// What the options window shows when it opens
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    pub mode: Mode,
    pub options: Options,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<NodeId>,
}

/// Initial form state for the current selection
///
/// A selection inside a generated table opens the form in edit mode with
/// that table's stored options; anything else opens a new table form.
pub fn form_state<D: HostDocument>(document: &D, defaults: &Options) -> FormState {
    let target = document
        .selection()
        .last()
        .and_then(|&node| find_table(document, node));

    if let Some(target) = target {
        match stored_options(document, target) {
            Ok(options) => {
                return FormState {
                    mode: Mode::Edit,
                    options: Options {
                        mode: Mode::Edit,
                        ..options
                    },
                    target: Some(target),
                }
            }
            Err(e) => warn!(table = %target, "ignoring table with unreadable options: {}", e),
        }
    }

    FormState {
        mode: Mode::New,
        options: Options {
            mode: Mode::New,
            ..defaults.clone()
        },
        target: None,
    }
}

/// Routes the commands of one options window
pub struct Dispatcher<R, D> {
    resolver: R,
    document: Option<D>,
    config: Config,
    target: Option<NodeId>,
    closed: bool,
}

impl<R, D> Dispatcher<R, D>
where
    R: LibraryResolver,
    D: HostDocument,
{
    pub fn new(resolver: R, document: Option<D>, config: Config) -> Self {
        Self {
            resolver,
            document,
            config,
            target: None,
            closed: false,
        }
    }

    pub fn document(&self) -> Option<&D> {
        self.document.as_ref()
    }

    pub fn into_document(self) -> Option<D> {
        self.document
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Compute the form state and remember the edit target
    pub fn open(&mut self) -> TableResult<FormState> {
        let defaults = self.config.default_options()?;
        let state = match &self.document {
            Some(document) => form_state(document, &defaults),
            None => form_state_without_document(defaults),
        };
        self.target = state.target;
        self.closed = false;
        Ok(state)
    }

    /// Handle one command
    pub async fn dispatch(&mut self, command: Command) -> Outcome {
        debug!(?command, "dispatching");
        match command {
            Command::Cancel => {
                self.closed = true;
                Outcome::Cancelled
            }
            Command::Resize { height } => Outcome::Resized {
                width: WINDOW_WIDTH,
                height,
            },
            Command::Submit { fields } => match self.submit(&fields).await {
                Ok(outcome) => {
                    self.closed = true;
                    outcome
                }
                Err(e) => {
                    error!("submit failed: {}", e);
                    Outcome::Failed {
                        message: e.to_string(),
                    }
                }
            },
        }
    }

    /// Decode and handle one wire message
    pub async fn dispatch_json(&mut self, input: &str) -> Outcome {
        match Command::from_json(input) {
            Ok(command) => self.dispatch(command).await,
            Err(e) => Outcome::Failed {
                message: e.to_string(),
            },
        }
    }

    async fn submit(&mut self, fields: &RawOptions) -> TableResult<Outcome> {
        if self.closed {
            return Err(TableError::Protocol("window already closed".to_string()));
        }
        let document = self.document.as_mut().ok_or(TableError::NoActiveDocument)?;
        let defaults = self.config.default_options()?;
        let requested = normalize_with(fields, &defaults)?;
        let ctx = self.config.build_context();

        match requested.mode {
            Mode::New => {
                let options = validate(requested)?;
                let output = build_table(&self.resolver, document, &options, &ctx).await?;
                Ok(Outcome::Built(output))
            }
            Mode::Edit => {
                let target = self
                    .target
                    .or_else(|| {
                        let selected = document.selection().last().copied()?;
                        find_table(document, selected)
                    })
                    .ok_or(ValidationError::MissingTarget)?;
                let options = edit_options(document, target, fields)?;
                let output =
                    edit_table(&self.resolver, document, target, &options, &ctx).await?;
                Ok(Outcome::Edited(output))
            }
        }
    }
}

fn form_state_without_document(defaults: Options) -> FormState {
    FormState {
        mode: Mode::New,
        options: defaults,
        target: None,
    }
}
