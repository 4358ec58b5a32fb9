//! Host form-system boundary.
//!
//! A host form binds a control through [`ControlValueAccessor`] (value writes,
//! disabled state, change and touch listeners) and asks for its validation
//! status through [`Validatable`].

use std::fmt;

/// Single validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationError {
	/// A value is required but nothing is selected.
	Required,
}

impl ValidationError {
	pub const fn key(self) -> &'static str {
		match self {
			Self::Required => "required",
		}
	}
}

/// Non-empty set of validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
	errors: Vec<ValidationError>,
}

impl ValidationErrors {
	/// Returns `None` for an empty error list.
	pub fn from_errors(errors: Vec<ValidationError>) -> Option<Self> {
		(!errors.is_empty()).then_some(Self { errors })
	}

	pub fn contains(&self, error: ValidationError) -> bool {
		self.errors.contains(&error)
	}

	pub fn iter(&self) -> impl Iterator<Item = ValidationError> + '_ {
		self.errors.iter().copied()
	}
}

impl fmt::Display for ValidationErrors {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (idx, error) in self.errors.iter().enumerate() {
			if idx > 0 {
				f.write_str(", ")?;
			}
			f.write_str(error.key())?;
		}
		Ok(())
	}
}

/// Anything that can report its current validation status.
pub trait Validatable {
	/// Returns `None` when valid.
	fn validate(&self) -> Option<ValidationErrors>;
}

/// Value binding between a control and a host form.
pub trait ControlValueAccessor {
	type Value;

	/// Writes a value coming from the form model.
	fn write_value(&self, value: Option<Self::Value>);

	/// Enables or disables user interaction.
	fn set_disabled(&self, disabled: bool);

	/// Registers a listener fired once per committed value change.
	fn register_on_change<F>(&self, listener: F)
	where
		F: Fn(Option<&Self::Value>) + Send + Sync + 'static;

	/// Registers a listener fired on the first user interaction.
	fn register_on_touched<F>(&self, listener: F)
	where
		F: Fn() + Send + Sync + 'static;
}
