//! Multi-step form engine
//!
//! Provider registration (accommodation, restaurant, guide, taxi, repair
//! shop, housekeeping ...) walks the user through a fixed sequence of steps.
//! Each step declares its fields and the rules they must satisfy. The form
//! only moves forward when the current step's required fields are valid.

use std::collections::BTreeMap;
use std::collections::HashSet;

use thiserror::Error;
use validator::{ValidateEmail, ValidateLength};

/// Field-name → error message
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldRule {
    Required,
    Email,
    MinLength(u64),
    MaxLength(u64),
    /// Numeric value within inclusive bounds
    Range { min: f64, max: f64 },
    /// 7 to 15 digits, optional leading `+`, spaces and dashes allowed
    Phone,
}

impl FieldRule {
    /// Error message if `value` breaks this rule.
    fn check(&self, label: &str, value: &str) -> Option<String> {
        let value = value.trim();
        match self {
            FieldRule::Required => value.is_empty().then(|| format!("{label} is required")),
            // Only `Required` fires on an empty value
            _ if value.is_empty() => None,
            FieldRule::Email => {
                (!value.validate_email()).then(|| format!("{label} must be a valid email address"))
            }
            FieldRule::MinLength(min) => (!value.validate_length(Some(*min), None, None))
                .then(|| format!("{label} must be at least {min} characters")),
            FieldRule::MaxLength(max) => (!value.validate_length(None, Some(*max), None))
                .then(|| format!("{label} must be at most {max} characters")),
            FieldRule::Range { min, max } => match value.parse::<f64>() {
                Ok(n) if n >= *min && n <= *max => None,
                Ok(_) => Some(format!("{label} must be between {min} and {max}")),
                Err(_) => Some(format!("{label} must be a number")),
            },
            FieldRule::Phone => {
                let digits = value.chars().filter(char::is_ascii_digit).count();
                let well_formed = value
                    .char_indices()
                    .all(|(i, c)| c.is_ascii_digit() || c == ' ' || c == '-' || (c == '+' && i == 0));
                (!(well_formed && (7..=15).contains(&digits)))
                    .then(|| format!("{label} must be a valid phone number"))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub rules: Vec<FieldRule>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            rules: Vec::new(),
        }
    }

    pub fn rule(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn required(self) -> Self {
        self.rule(FieldRule::Required)
    }

    pub fn is_required(&self) -> bool {
        self.rules.contains(&FieldRule::Required)
    }

    fn check(&self, value: &str) -> Option<String> {
        self.rules.iter().find_map(|rule| rule.check(&self.label, value))
    }
}

/// One page of a multi-step form
#[derive(Debug, Clone)]
pub struct StepSchema {
    pub title: String,
    pub fields: Vec<FieldSpec>,
}

impl StepSchema {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("a form needs at least one step")]
    NoSteps,

    #[error("field `{0}` is declared more than once")]
    DuplicateField(String),

    #[error("unknown field `{0}`")]
    UnknownField(String),

    #[error("step {step} has {} invalid field(s)", .errors.len())]
    StepInvalid { step: usize, errors: FieldErrors },

    #[error("already on the last step")]
    LastStep,
}

/// Linear state machine over the steps of one form
#[derive(Debug, Clone)]
pub struct StepForm {
    steps: Vec<StepSchema>,
    current: usize,
    values: BTreeMap<String, String>,
    errors: FieldErrors,
}

impl StepForm {
    pub fn new(steps: Vec<StepSchema>) -> Result<Self, FormError> {
        if steps.is_empty() {
            return Err(FormError::NoSteps);
        }
        let mut seen = HashSet::new();
        for field in steps.iter().flat_map(|s| &s.fields) {
            if !seen.insert(field.name.as_str()) {
                return Err(FormError::DuplicateField(field.name.clone()));
            }
        }
        Ok(Self {
            steps,
            current: 0,
            values: BTreeMap::new(),
            errors: FieldErrors::new(),
        })
    }

    pub fn current_step(&self) -> usize {
        self.current
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn current_schema(&self) -> &StepSchema {
        &self.steps[self.current]
    }

    pub fn is_last_step(&self) -> bool {
        self.current + 1 == self.steps.len()
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Set a field value; clears any error shown for that field.
    pub fn set_field(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), FormError> {
        let name = name.into();
        if self.find_field(&name).is_none() {
            return Err(FormError::UnknownField(name));
        }
        self.errors.remove(&name);
        self.values.insert(name, value.into());
        Ok(())
    }

    /// Validate every field of the current step and record the errors.
    ///
    /// Returns `true` when none of the step's required fields has an error.
    pub fn validate_step(&mut self) -> bool {
        self.validate(self.current)
    }

    /// Advance to the next step if the current one validates.
    pub fn next(&mut self) -> Result<usize, FormError> {
        if self.is_last_step() {
            return Err(FormError::LastStep);
        }
        if !self.validate_step() {
            return Err(FormError::StepInvalid {
                step: self.current,
                errors: self.errors.clone(),
            });
        }
        self.current += 1;
        tracing::debug!(step = self.current, "Form advanced");
        Ok(self.current)
    }

    /// Go back one step; values entered so far are kept.
    pub fn back(&mut self) -> usize {
        self.current = self.current.saturating_sub(1);
        self.current
    }

    /// Validate all steps and return the collected values.
    ///
    /// On failure the form jumps to the first step that does not validate.
    pub fn submit(&mut self) -> Result<BTreeMap<String, String>, FormError> {
        for step in 0..self.steps.len() {
            if !self.validate(step) {
                self.current = step;
                return Err(FormError::StepInvalid {
                    step,
                    errors: self.errors.clone(),
                });
            }
        }
        Ok(self.values.clone())
    }

    fn validate(&mut self, step: usize) -> bool {
        self.errors.clear();
        let mut blocking = false;
        for field in &self.steps[step].fields {
            let value = self.values.get(&field.name).map(String::as_str).unwrap_or("");
            if let Some(message) = field.check(value) {
                blocking |= field.is_required();
                self.errors.insert(field.name.clone(), message);
            }
        }
        !blocking
    }

    fn find_field(&self, name: &str) -> Option<&FieldSpec> {
        self.steps
            .iter()
            .flat_map(|s| &s.fields)
            .find(|f| f.name == name)
    }
}
