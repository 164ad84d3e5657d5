//! Typed step descriptors
//!
//! Each unit of operator interaction is a plain data value: a display, a
//! prompt for one typed input, a choice over a closed option set, or a
//! confirmation gate. The sequencer executes descriptors strictly in order;
//! because steps are data, tests can script and replay them without any
//! rendering runtime.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// One label/value row in a metadata display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
    /// Row label
    pub label: String,
    /// Rendered value
    pub value: String,
}

impl MetadataEntry {
    /// Create a metadata row
    #[inline]
    #[must_use]
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Read-only information presented to the operator
///
/// Display steps never block on external mutation; they only render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DisplayStep {
    /// Titled label/value list or card
    Metadata {
        /// Section title
        title: String,
        /// Rows
        entries: Vec<MetadataEntry>,
    },
    /// Markdown block
    Markdown {
        /// Markdown body
        body: String,
    },
    /// Section heading
    Heading {
        /// Heading text
        title: String,
    },
    /// Tabular data
    Table {
        /// Table title
        title: String,
        /// Column labels
        columns: Vec<String>,
        /// Row cells, one vector per row
        rows: Vec<Vec<String>>,
    },
    /// Preformatted code block
    Code {
        /// Block title
        title: String,
        /// Code body
        body: String,
    },
    /// Inline validation message re-presenting a rejected step
    Notice {
        /// Message text
        message: String,
    },
}

impl DisplayStep {
    /// Metadata card
    #[inline]
    #[must_use]
    pub fn metadata(title: impl Into<String>, entries: Vec<MetadataEntry>) -> Self {
        Self::Metadata {
            title: title.into(),
            entries,
        }
    }

    /// Markdown block
    #[inline]
    #[must_use]
    pub fn markdown(body: impl Into<String>) -> Self {
        Self::Markdown { body: body.into() }
    }

    /// Section heading
    #[inline]
    #[must_use]
    pub fn heading(title: impl Into<String>) -> Self {
        Self::Heading {
            title: title.into(),
        }
    }

    /// Table display
    #[inline]
    #[must_use]
    pub fn table(
        title: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    ) -> Self {
        Self::Table {
            title: title.into(),
            columns,
            rows,
        }
    }

    /// Code block
    #[inline]
    #[must_use]
    pub fn code(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Code {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Validation notice
    #[inline]
    #[must_use]
    pub fn notice(message: impl Into<String>) -> Self {
        Self::Notice {
            message: message.into(),
        }
    }
}

/// An uploaded or referenced file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    /// Original file name
    pub name: String,
    /// Size in bytes
    pub size_bytes: u64,
    /// Public URL once stored, when known
    pub url: Option<String>,
}

impl FileRef {
    /// File reference without a stored URL
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            url: None,
        }
    }

    /// Lowercased extension, if any
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
    }
}

/// One typed value collected from the operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputValue {
    /// Text (plain, rich, email, url)
    Text(String),
    /// Numeric input
    Number(f64),
    /// Boolean input
    Bool(bool),
    /// Calendar date
    Date(NaiveDate),
    /// One or more files
    Files(Vec<FileRef>),
}

impl InputValue {
    /// Read as text
    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Read as a number
    #[inline]
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Read as a boolean
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Read as a date
    #[inline]
    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Read as a file list
    #[inline]
    #[must_use]
    pub fn as_files(&self) -> Option<&[FileRef]> {
        match self {
            Self::Files(files) => Some(files),
            _ => None,
        }
    }

    /// Short label for diagnostics
    #[inline]
    #[must_use]
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Number(_) => "number",
            Self::Bool(_) => "boolean",
            Self::Date(_) => "date",
            Self::Files(_) => "files",
        }
    }
}

/// Declared input type of a prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PromptKind {
    /// Free text
    Text {
        /// Render a multi-line editor
        multiline: bool,
    },
    /// Formatted text (stored as text)
    RichText,
    /// Email address
    Email,
    /// URL
    Url,
    /// Number with optional inclusive bounds
    Number {
        /// Minimum accepted value
        min: Option<f64>,
        /// Maximum accepted value
        max: Option<f64>,
    },
    /// Yes/no toggle
    Boolean,
    /// Calendar date
    Date,
    /// File upload
    File {
        /// Accepted lowercase extensions; empty accepts anything
        allowed_extensions: Vec<String>,
        /// Allow selecting more than one file
        multiple: bool,
    },
}

impl PromptKind {
    /// Built-in type check for a collected value
    ///
    /// Returns a re-promptable message on mismatch; workflow-supplied
    /// validators run after this check.
    pub fn check(&self, value: &InputValue) -> Result<(), String> {
        match (self, value) {
            (Self::Text { .. } | Self::RichText, InputValue::Text(_)) => Ok(()),
            (Self::Email, InputValue::Text(text)) => {
                match text.split_once('@') {
                    Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
                    _ => Err(format!("`{text}` is not a valid email address")),
                }
            }
            (Self::Url, InputValue::Text(text)) => {
                if text.starts_with("http://") || text.starts_with("https://") {
                    Ok(())
                } else {
                    Err(format!("`{text}` is not an http(s) URL"))
                }
            }
            (Self::Number { min, max }, InputValue::Number(n)) => {
                if let Some(min) = min {
                    if n < min {
                        return Err(format!("must be at least {min}"));
                    }
                }
                if let Some(max) = max {
                    if n > max {
                        return Err(format!("must be at most {max}"));
                    }
                }
                Ok(())
            }
            (Self::Boolean, InputValue::Bool(_)) | (Self::Date, InputValue::Date(_)) => Ok(()),
            (
                Self::File {
                    allowed_extensions,
                    multiple,
                },
                InputValue::Files(files),
            ) => {
                if files.is_empty() {
                    return Err("select at least one file".to_string());
                }
                if !multiple && files.len() > 1 {
                    return Err("select a single file".to_string());
                }
                if !allowed_extensions.is_empty() {
                    for file in files {
                        let ext = file.extension().unwrap_or_default();
                        if !allowed_extensions.contains(&ext) {
                            return Err(format!(
                                "`{}` must be one of: {}",
                                file.name,
                                allowed_extensions.join(", ")
                            ));
                        }
                    }
                }
                Ok(())
            }
            (expected, got) => Err(format!(
                "expected {} input, got {}",
                expected.label(),
                got.kind_label()
            )),
        }
    }

    /// Short label for diagnostics
    #[inline]
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::RichText => "rich text",
            Self::Email => "email",
            Self::Url => "url",
            Self::Number { .. } => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::File { .. } => "file",
        }
    }
}

/// Workflow-supplied validation predicate for one prompt
pub type Validator = dyn Fn(&InputValue) -> Result<(), String> + Send + Sync;

/// A prompt collecting one typed value
#[derive(Clone)]
pub struct PromptStep {
    /// Prompt label
    pub label: String,
    /// Declared input type
    pub kind: PromptKind,
    /// Help text shown under the input
    pub help_text: Option<String>,
    /// Pre-filled default
    pub default: Option<InputValue>,
    /// Bag key enabling skip-ahead when the value arrived as a parameter
    pub param_key: Option<&'static str>,
    /// Extra validation run after the built-in type check
    pub validator: Option<Arc<Validator>>,
}

impl fmt::Debug for PromptStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptStep")
            .field("label", &self.label)
            .field("kind", &self.kind)
            .field("help_text", &self.help_text)
            .field("default", &self.default)
            .field("param_key", &self.param_key)
            .field("validator", &self.validator.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl PromptStep {
    /// Prompt with an explicit kind
    #[inline]
    #[must_use]
    pub fn new(label: impl Into<String>, kind: PromptKind) -> Self {
        Self {
            label: label.into(),
            kind,
            help_text: None,
            default: None,
            param_key: None,
            validator: None,
        }
    }

    /// Single-line text prompt
    #[inline]
    #[must_use]
    pub fn text(label: impl Into<String>) -> Self {
        Self::new(label, PromptKind::Text { multiline: false })
    }

    /// Multi-line text prompt
    #[inline]
    #[must_use]
    pub fn multiline(label: impl Into<String>) -> Self {
        Self::new(label, PromptKind::Text { multiline: true })
    }

    /// Rich text prompt
    #[inline]
    #[must_use]
    pub fn rich_text(label: impl Into<String>) -> Self {
        Self::new(label, PromptKind::RichText)
    }

    /// Email prompt
    #[inline]
    #[must_use]
    pub fn email(label: impl Into<String>) -> Self {
        Self::new(label, PromptKind::Email)
    }

    /// URL prompt
    #[inline]
    #[must_use]
    pub fn url(label: impl Into<String>) -> Self {
        Self::new(label, PromptKind::Url)
    }

    /// Bounded number prompt
    #[inline]
    #[must_use]
    pub fn number(label: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Self {
        Self::new(label, PromptKind::Number { min, max })
    }

    /// Boolean prompt
    #[inline]
    #[must_use]
    pub fn boolean(label: impl Into<String>) -> Self {
        Self::new(label, PromptKind::Boolean)
    }

    /// Date prompt
    #[inline]
    #[must_use]
    pub fn date(label: impl Into<String>) -> Self {
        Self::new(label, PromptKind::Date)
    }

    /// Single-file prompt with an extension filter
    #[inline]
    #[must_use]
    pub fn file(label: impl Into<String>, allowed_extensions: Vec<String>) -> Self {
        Self::new(
            label,
            PromptKind::File {
                allowed_extensions,
                multiple: false,
            },
        )
    }

    /// Multi-file prompt
    #[inline]
    #[must_use]
    pub fn files(label: impl Into<String>) -> Self {
        Self::new(
            label,
            PromptKind::File {
                allowed_extensions: Vec::new(),
                multiple: true,
            },
        )
    }

    /// Attach help text
    #[inline]
    #[must_use]
    pub fn with_help(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = Some(help_text.into());
        self
    }

    /// Attach a default value
    #[inline]
    #[must_use]
    pub fn with_default(mut self, default: InputValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Enable skip-ahead from the parameter bag
    #[inline]
    #[must_use]
    pub fn with_param_key(mut self, key: &'static str) -> Self {
        self.param_key = Some(key);
        self
    }

    /// Attach a validation predicate
    #[inline]
    #[must_use]
    pub fn with_validator(
        mut self,
        validator: impl Fn(&InputValue) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }
}

/// Visual weight of a choice option or button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    /// Default emphasis
    Primary,
    /// De-emphasized
    Secondary,
    /// Destructive action
    Danger,
}

/// One labeled option of a choice step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    /// Rendered label
    pub label: String,
    /// Stable value returned on selection
    pub value: String,
    /// Optional theme hint
    pub theme: Option<Theme>,
}

impl ChoiceOption {
    /// Option with distinct label and value
    #[inline]
    #[must_use]
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            theme: None,
        }
    }

    /// Attach a theme hint
    #[inline]
    #[must_use]
    pub fn themed(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }
}

impl From<&str> for ChoiceOption {
    fn from(label: &str) -> Self {
        Self::new(label, label)
    }
}

/// An enumerated decision point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceStep {
    /// Step label
    pub label: String,
    /// Ordered closed option set
    pub options: Vec<ChoiceOption>,
    /// Value of the pre-selected option
    pub default: Option<String>,
    /// Allow selecting more than one option
    pub multi: bool,
    /// Upper bound for multi-select answers
    pub max_selections: Option<usize>,
    /// Bag key enabling skip-ahead when the value arrived as a parameter
    pub param_key: Option<&'static str>,
}

impl ChoiceStep {
    /// Single-select choice
    #[inline]
    #[must_use]
    pub fn single(label: impl Into<String>, options: Vec<ChoiceOption>) -> Self {
        Self {
            label: label.into(),
            options,
            default: None,
            multi: false,
            max_selections: None,
            param_key: None,
        }
    }

    /// Multi-select choice
    #[inline]
    #[must_use]
    pub fn multi(label: impl Into<String>, options: Vec<ChoiceOption>) -> Self {
        Self {
            label: label.into(),
            options,
            default: None,
            multi: true,
            max_selections: None,
            param_key: None,
        }
    }

    /// Pre-select the option with the given value
    #[inline]
    #[must_use]
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Bound the number of multi-select answers
    #[inline]
    #[must_use]
    pub fn with_max_selections(mut self, max: usize) -> Self {
        self.max_selections = Some(max);
        self
    }

    /// Enable skip-ahead from the parameter bag
    #[inline]
    #[must_use]
    pub fn with_param_key(mut self, key: &'static str) -> Self {
        self.param_key = Some(key);
        self
    }

    /// Whether `value` names a declared option
    #[inline]
    #[must_use]
    pub fn has_value(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }
}

/// A binary yes/no gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmStep {
    /// Question shown to the operator
    pub label: String,
    /// Help text shown under the question
    pub help_text: Option<String>,
    /// Require the operator to re-authenticate before answering
    pub identity: bool,
}

impl ConfirmStep {
    /// Plain confirmation
    #[inline]
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            help_text: None,
            identity: false,
        }
    }

    /// Identity re-confirmation
    #[inline]
    #[must_use]
    pub fn identity(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            help_text: None,
            identity: true,
        }
    }

    /// Attach help text
    #[inline]
    #[must_use]
    pub fn with_help(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = Some(help_text.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_check() {
        let kind = PromptKind::Email;
        assert!(kind.check(&InputValue::Text("ops@example.com".into())).is_ok());
        assert!(kind.check(&InputValue::Text("not-an-email".into())).is_err());
        assert!(kind.check(&InputValue::Text("@example.com".into())).is_err());
    }

    #[test]
    fn number_bounds_check() {
        let kind = PromptKind::Number {
            min: Some(0.0),
            max: Some(100.0),
        };
        assert!(kind.check(&InputValue::Number(25.0)).is_ok());
        assert!(kind.check(&InputValue::Number(101.0)).is_err());
        assert!(kind.check(&InputValue::Number(-1.0)).is_err());
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let kind = PromptKind::Boolean;
        let err = kind.check(&InputValue::Text("yes".into())).unwrap_err();
        assert!(err.contains("boolean"));
    }

    #[test]
    fn file_extension_filter() {
        let kind = PromptKind::File {
            allowed_extensions: vec!["png".into(), "jpg".into()],
            multiple: false,
        };
        assert!(kind
            .check(&InputValue::Files(vec![FileRef::new("logo.PNG", 10)]))
            .is_ok());
        assert!(kind
            .check(&InputValue::Files(vec![FileRef::new("logo.gif", 10)]))
            .is_err());
        assert!(kind
            .check(&InputValue::Files(vec![
                FileRef::new("a.png", 1),
                FileRef::new("b.png", 1)
            ]))
            .is_err());
    }

    #[test]
    fn choice_step_knows_its_options() {
        let step = ChoiceStep::single(
            "Moderate",
            vec![
                ChoiceOption::new("Allow", "allow"),
                ChoiceOption::new("Mark comment as spam", "mark-spam"),
                ChoiceOption::new("Delete comment and ban user", "ban").themed(Theme::Danger),
            ],
        );
        assert!(step.has_value("mark-spam"));
        assert!(!step.has_value("escalate"));
    }
}
