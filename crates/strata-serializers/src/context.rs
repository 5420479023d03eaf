//! Per-run validation state
//!
//! A [`ValidationContext`] travels down the field tree while a serializer
//! validates its input. It tracks how deep validation has descended and
//! whether the run is a partial update.

use crate::errors::{ErrorMessage, ValidationError};
use crate::settings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationContext {
	/// Current depth level (0 = root)
	current_depth: usize,
	/// Maximum allowed depth
	max_depth: usize,
	/// Missing required fields are skipped instead of reported
	partial: bool,
}

impl ValidationContext {
	/// Root context using the configured depth limit
	///
	/// # Examples
	///
	/// ```
	/// use strata_serializers::ValidationContext;
	///
	/// let ctx = ValidationContext::new(false);
	/// assert_eq!(ctx.current_depth(), 0);
	/// assert!(!ctx.is_partial());
	/// ```
	pub fn new(partial: bool) -> Self {
		Self::with_max_depth(settings::get().max_depth, partial)
	}

	pub fn with_max_depth(max_depth: usize, partial: bool) -> Self {
		Self {
			current_depth: 0,
			max_depth,
			partial,
		}
	}

	pub fn current_depth(&self) -> usize {
		self.current_depth
	}

	pub fn max_depth(&self) -> usize {
		self.max_depth
	}

	pub fn remaining_depth(&self) -> usize {
		self.max_depth.saturating_sub(self.current_depth)
	}

	pub fn is_partial(&self) -> bool {
		self.partial
	}

	pub fn can_go_deeper(&self) -> bool {
		self.current_depth < self.max_depth
	}

	/// Context one level deeper
	///
	/// # Examples
	///
	/// ```
	/// use strata_serializers::ValidationContext;
	///
	/// let ctx = ValidationContext::with_max_depth(1, false);
	/// let child = ctx.child().unwrap();
	/// assert_eq!(child.current_depth(), 1);
	/// assert!(child.child().is_err());
	/// ```
	pub fn child(&self) -> Result<Self, ValidationError> {
		if !self.can_go_deeper() {
			tracing::debug!(max_depth = self.max_depth, "nesting depth exceeded");
			return Err(ErrorMessage::new(
				format!("Maximum nesting depth of {} exceeded.", self.max_depth),
				"max_depth",
			)
			.into());
		}
		Ok(Self {
			current_depth: self.current_depth + 1,
			max_depth: self.max_depth,
			partial: self.partial,
		})
	}
}

impl Default for ValidationContext {
	fn default() -> Self {
		Self::new(false)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_child_keeps_partial_flag() {
		let ctx = ValidationContext::with_max_depth(3, true);
		let child = ctx.child().unwrap();

		assert!(child.is_partial());
		assert_eq!(child.remaining_depth(), 2);
	}

	#[rstest]
	fn test_depth_limit_reports_code() {
		let ctx = ValidationContext::with_max_depth(0, false);
		let err = ctx.child().unwrap_err();

		assert_eq!(err.detail().codes(), serde_json::json!(["max_depth"]));
	}
}
