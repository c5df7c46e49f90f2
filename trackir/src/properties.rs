//! Named, bounded configuration properties.
//!
//! Hosts use these to tweak configuration by name (from a command line or a UI) without knowing
//! the concrete configuration types.

use anyhow::{anyhow, Result};

/// Object with custom properties.
pub trait Properties {
    /// Get available properties.
    fn props_mut(&mut self) -> Vec<(&str, PropertyMut)>;

    /// Check whether there is a property called `name`.
    fn has_prop(&mut self, name: &str) -> bool {
        self.props_mut().iter().any(|(n, _)| *n == name)
    }

    /// Parse and set a property from its textual form.
    fn parse_prop(&mut self, name: &str, value: &str) -> Result<()> {
        let mut props = self.props_mut();
        let (_, prop) = props
            .iter_mut()
            .find(|(n, _)| *n == name)
            .ok_or_else(|| anyhow!("unknown property `{name}`"))?;
        prop.parse(value)
    }
}

/// Mutable floating point property with a lower and upper bound.
pub struct PropertyMut<'a> {
    val: &'a mut f64,
    min: f64,
    max: f64,
}

impl<'a> PropertyMut<'a> {
    /// Create a property.
    ///
    /// # Arguments
    ///
    /// * `val` - reference to the underlying float to be mutated.
    /// * `min` - lowest value for the property.
    /// * `max` - highest value for the property.
    pub fn new(val: &'a mut f64, min: f64, max: f64) -> Self {
        Self { val, min, max }
    }

    /// Parse `value` and store it, provided it is within bounds.
    pub fn parse(&mut self, value: &str) -> Result<()> {
        let parsed: f64 = value.parse()?;

        if !(self.min..=self.max).contains(&parsed) {
            return Err(anyhow!(
                "{parsed} is out of range [{}; {}]",
                self.min,
                self.max
            ));
        }

        *self.val = parsed;

        Ok(())
    }
}
