//! Stepper for a cart line's quantity.
//!
//! [`QuantityControl`] decides what a +/- press means without doing any I/O;
//! the caller sends the resulting [`Change`] to the server right away and
//! feeds the refreshed quantity back through [`QuantityControl::apply`].

/// Result of pressing + or -.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// Send this quantity.
    Set(u32),
    /// Remove the line.
    Remove,
    /// Already at the stock ceiling.
    AtLimit,
    /// At one and removal is not allowed here.
    Disabled,
}

impl Change {
    /// Whether the press produced something to send.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Set(_) | Self::Remove)
    }
}

/// Quantity stepper bounded by stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityControl {
    value: u32,
    max: u32,
    removable: bool,
}

impl QuantityControl {
    /// Create a control showing `value` (clamped to `max`).
    #[must_use]
    pub fn new(value: u32, max: u32, removable: bool) -> Self {
        Self {
            value: value.min(max),
            max,
            removable,
        }
    }

    #[must_use]
    pub const fn value(&self) -> u32 {
        self.value
    }

    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    #[must_use]
    pub const fn can_increment(&self) -> bool {
        self.value < self.max
    }

    #[must_use]
    pub const fn can_decrement(&self) -> bool {
        self.value > 1 || (self.value == 1 && self.removable)
    }

    /// Press +.
    pub fn increment(&mut self) -> Change {
        if !self.can_increment() {
            return Change::AtLimit;
        }
        self.value += 1;
        Change::Set(self.value)
    }

    /// Press -.
    pub fn decrement(&mut self) -> Change {
        match self.value {
            0 => Change::Disabled,
            1 if self.removable => {
                self.value = 0;
                Change::Remove
            }
            1 => Change::Disabled,
            n => {
                self.value = n - 1;
                Change::Set(self.value)
            }
        }
    }

    /// Set the shown quantity directly, clamped to the stock ceiling.
    ///
    /// Values may arrive in any order; the shown value stays within bounds.
    pub fn apply(&mut self, quantity: u32) {
        self.value = quantity.min(self.max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_stops_at_stock() {
        let mut control = QuantityControl::new(2, 3, true);
        assert_eq!(control.increment(), Change::Set(3));
        assert_eq!(control.increment(), Change::AtLimit);
        assert_eq!(control.value(), 3);
    }

    #[test]
    fn test_decrement_at_one_removes_when_allowed() {
        let mut control = QuantityControl::new(1, 5, true);
        assert_eq!(control.decrement(), Change::Remove);
        assert_eq!(control.value(), 0);
        assert_eq!(control.decrement(), Change::Disabled);
    }

    #[test]
    fn test_decrement_at_one_disabled_without_removal() {
        let mut control = QuantityControl::new(1, 5, false);
        assert!(!control.can_decrement());
        assert_eq!(control.decrement(), Change::Disabled);
        assert_eq!(control.value(), 1);
    }

    #[test]
    fn test_decrement_above_one() {
        let mut control = QuantityControl::new(3, 5, false);
        assert_eq!(control.decrement(), Change::Set(2));
        assert!(control.decrement().is_accepted());
        assert_eq!(control.value(), 1);
    }

    #[test]
    fn test_apply_clamps_in_any_order() {
        let mut control = QuantityControl::new(1, 3, true);
        for quantity in [4, 0, 2, 10, 3, 1] {
            control.apply(quantity);
            assert!(control.value() <= control.max());
        }
        assert_eq!(control.value(), 1);
    }

    #[test]
    fn test_new_clamps_to_stock() {
        let mut control = QuantityControl::new(7, 3, true);
        assert_eq!(control.value(), 3);
        assert_eq!(control.increment(), Change::AtLimit);
    }

    #[test]
    fn test_out_of_stock() {
        let mut control = QuantityControl::new(0, 0, true);
        assert_eq!(control.increment(), Change::AtLimit);
        assert_eq!(control.decrement(), Change::Disabled);
    }

    #[test]
    fn test_never_emits_above_max_or_below_zero() {
        let mut control = QuantityControl::new(1, 4, true);
        let presses = [true, true, true, true, true, false, false, false, false, false];
        for up in presses {
            let change = if up {
                control.increment()
            } else {
                control.decrement()
            };
            if let Change::Set(n) = change {
                assert!((1..=4).contains(&n));
            }
            assert!(control.value() <= 4);
        }
    }
}
