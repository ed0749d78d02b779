//! # Stock Allocation
//!
//! Plans debits and credits against an item's three stock counters.
//!
//! Planning is pure: it returns the ordered tier movements and the stock
//! they lead to. The storage layer writes the final counters in a single
//! statement, so a reader never sees a half-broken carton.
//!
//! ## Unit Debit Cascade
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sell N units                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  total = units + rolls × per_roll + cartons × per_carton                │
//! │       │                                                                 │
//! │       ├── total < N ─────────────────────► InsufficientStock            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. take loose units                                                    │
//! │  2. break ⌈rem / per_roll⌉ rolls (capped at stock)                      │
//! │  3. break ⌈rem / per_carton⌉ cartons                                    │
//! │       ├── rolls exist: cartons → rolls, then just enough rolls → units  │
//! │       └── otherwise:   cartons → units                                  │
//! │  4. remainder left ──────────────────────► LogicError                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{Item, UnitKind};
use crate::units::{beyond_range, checked_count, has_roll_structure, total_units, units_per_carton};
use crate::validation::validate_quantity;
use crate::MAX_STOCK_COUNT;

// =============================================================================
// Stock Levels
// =============================================================================

/// The three stock counters of one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StockLevels {
    pub cartons: i64,
    pub rolls: i64,
    pub units: i64,
}

impl StockLevels {
    pub fn new(cartons: i64, rolls: i64, units: i64) -> Self {
        StockLevels {
            cartons,
            rolls,
            units,
        }
    }

    fn get(&self, unit: UnitKind) -> i64 {
        match unit {
            UnitKind::Carton => self.cartons,
            UnitKind::Roll => self.rolls,
            UnitKind::Unit => self.units,
        }
    }

    fn slot(&mut self, unit: UnitKind) -> &mut i64 {
        match unit {
            UnitKind::Carton => &mut self.cartons,
            UnitKind::Roll => &mut self.rolls,
            UnitKind::Unit => &mut self.units,
        }
    }

    /// Applies one movement. Fails if any counter would go negative or
    /// leave the `i64` range.
    pub fn apply(mut self, movement: &StockMovement) -> CoreResult<Self> {
        let before = self;
        let overflow = || CoreError::Logic(format!("{movement:?} overflows stock {before:?}"));
        match *movement {
            StockMovement::Break {
                from,
                count,
                into,
                yielded,
            } => {
                let taken = self.get(from).checked_sub(count).ok_or_else(overflow)?;
                let opened = self.get(into).checked_add(yielded).ok_or_else(overflow)?;
                *self.slot(from) = taken;
                *self.slot(into) = opened;
            }
            StockMovement::Deduct { unit, quantity } => {
                let left = self.get(unit).checked_sub(quantity).ok_or_else(overflow)?;
                *self.slot(unit) = left;
            }
            StockMovement::Add { unit, quantity } => {
                let received = self.get(unit).checked_add(quantity).ok_or_else(overflow)?;
                *self.slot(unit) = received;
            }
        }

        if self.cartons < 0 || self.rolls < 0 || self.units < 0 {
            return Err(CoreError::Logic(format!(
                "{:?} leaves negative stock {:?}",
                movement, self
            )));
        }
        Ok(self)
    }
}

// =============================================================================
// Movements and Plans
// =============================================================================

/// One step of a stock mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum StockMovement {
    /// Open `count` of `from` into `yielded` of the next finer unit.
    Break {
        from: UnitKind,
        count: i64,
        into: UnitKind,
        yielded: i64,
    },
    /// Remove sold stock.
    Deduct { unit: UnitKind, quantity: i64 },
    /// Receive purchased stock.
    Add { unit: UnitKind, quantity: i64 },
}

/// The result of planning a debit or credit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockPlan {
    pub before: StockLevels,
    pub movements: Vec<StockMovement>,
    pub after: StockLevels,
}

impl StockPlan {
    fn build(before: StockLevels, movements: Vec<StockMovement>) -> CoreResult<Self> {
        let after = movements
            .iter()
            .try_fold(before, |levels, movement| levels.apply(movement))?;
        Ok(StockPlan {
            before,
            movements,
            after,
        })
    }
}

/// Ceiling division for a non-negative `value` and positive `divisor`.
#[inline]
fn div_ceil(value: i64, divisor: i64) -> i64 {
    value / divisor + i64::from(value % divisor != 0)
}

// =============================================================================
// Debit
// =============================================================================

/// Plans the removal of `quantity` of `unit` from `item`'s stock.
///
/// ## Errors
/// - `Validation` - quantity not positive
/// - `InsufficientStock` - not enough convertible stock
/// - `Configuration` - a ratio needed for the conversion is zero or undefined
/// - `Logic` - the unit cascade ran dry after passing the total check
pub fn plan_debit(item: &Item, unit: UnitKind, quantity: i64) -> CoreResult<StockPlan> {
    validate_quantity(quantity)?;
    let stock = item.stock();

    let movements = match unit {
        UnitKind::Carton => debit_cartons(item, stock, quantity)?,
        UnitKind::Roll => debit_rolls(item, stock, quantity)?,
        UnitKind::Unit => debit_units(item, stock, quantity)?,
    };

    StockPlan::build(stock, movements)
}

fn insufficient(item: &Item, unit: UnitKind, available: i64, requested: i64) -> CoreError {
    CoreError::InsufficientStock {
        item: item.name.clone(),
        unit,
        available,
        requested,
    }
}

fn debit_cartons(item: &Item, stock: StockLevels, quantity: i64) -> CoreResult<Vec<StockMovement>> {
    if stock.cartons < quantity {
        return Err(insufficient(item, UnitKind::Carton, stock.cartons, quantity));
    }
    Ok(vec![StockMovement::Deduct {
        unit: UnitKind::Carton,
        quantity,
    }])
}

/// Rolls cascade from cartons only. Loose units are never rebuilt into rolls.
fn debit_rolls(item: &Item, stock: StockLevels, quantity: i64) -> CoreResult<Vec<StockMovement>> {
    let mut movements = Vec::with_capacity(2);

    if stock.rolls < quantity {
        let deficit = quantity - stock.rolls;
        if item.rolls_per_carton <= 0 {
            return Err(CoreError::configuration(
                &item.name,
                "rolls per carton is not defined",
            ));
        }

        let cartons_to_break = div_ceil(deficit, item.rolls_per_carton);
        if stock.cartons < cartons_to_break {
            let available = checked_count(item, stock.cartons, item.rolls_per_carton)?
                .checked_add(stock.rolls)
                .ok_or_else(|| beyond_range(item))?;
            return Err(insufficient(item, UnitKind::Roll, available, quantity));
        }

        movements.push(StockMovement::Break {
            from: UnitKind::Carton,
            count: cartons_to_break,
            into: UnitKind::Roll,
            yielded: checked_count(item, cartons_to_break, item.rolls_per_carton)?,
        });
    }

    movements.push(StockMovement::Deduct {
        unit: UnitKind::Roll,
        quantity,
    });
    Ok(movements)
}

fn debit_units(item: &Item, stock: StockLevels, quantity: i64) -> CoreResult<Vec<StockMovement>> {
    let per_carton = units_per_carton(item);
    let available = total_units(item)?;

    if available < quantity {
        if per_carton.is_none() && stock.cartons > 0 {
            return Err(CoreError::configuration(
                &item.name,
                "cartons in stock but units per carton is not defined",
            ));
        }
        return Err(insufficient(item, UnitKind::Unit, available, quantity));
    }

    let mut movements = Vec::new();
    let mut remaining = quantity - stock.units.min(quantity);
    let mut rolls_left = stock.rolls;

    // Tier 2: break just enough rolls.
    if remaining > 0 && item.units_per_roll > 0 && rolls_left > 0 {
        let rolls = div_ceil(remaining, item.units_per_roll).min(rolls_left);
        let yielded = checked_count(item, rolls, item.units_per_roll)?;
        movements.push(StockMovement::Break {
            from: UnitKind::Roll,
            count: rolls,
            into: UnitKind::Unit,
            yielded,
        });
        rolls_left -= rolls;
        remaining -= yielded.min(remaining);
    }

    // Tier 3: break just enough cartons.
    if let Some(per_carton) = per_carton.filter(|_| remaining > 0 && stock.cartons > 0) {
        let cartons = div_ceil(remaining, per_carton).min(stock.cartons);

        if has_roll_structure(item) {
            let opened = checked_count(item, cartons, item.rolls_per_carton)?;
            movements.push(StockMovement::Break {
                from: UnitKind::Carton,
                count: cartons,
                into: UnitKind::Roll,
                yielded: opened,
            });
            rolls_left = rolls_left.checked_add(opened).ok_or_else(|| beyond_range(item))?;

            let rolls = div_ceil(remaining, item.units_per_roll).min(rolls_left);
            let yielded = checked_count(item, rolls, item.units_per_roll)?;
            movements.push(StockMovement::Break {
                from: UnitKind::Roll,
                count: rolls,
                into: UnitKind::Unit,
                yielded,
            });
            remaining -= yielded.min(remaining);
        } else {
            let yielded = checked_count(item, cartons, per_carton)?;
            movements.push(StockMovement::Break {
                from: UnitKind::Carton,
                count: cartons,
                into: UnitKind::Unit,
                yielded,
            });
            remaining -= yielded.min(remaining);
        }
    }

    if remaining > 0 {
        return Err(CoreError::Logic(format!(
            "allocation failed for {} despite sufficient total stock ({remaining} units unallocated)",
            item.name
        )));
    }

    movements.push(StockMovement::Deduct {
        unit: UnitKind::Unit,
        quantity,
    });
    Ok(movements)
}

// =============================================================================
// Credit
// =============================================================================

/// Plans the receipt of `quantity` of `unit`. Units are never restocked directly.
///
/// ## Errors
/// `Validation` when the quantity is not positive or the counter would pass
/// [`MAX_STOCK_COUNT`].
pub fn plan_credit(item: &Item, unit: UnitKind, quantity: i64) -> CoreResult<StockPlan> {
    if unit == UnitKind::Unit {
        return Err(CoreError::UnsupportedUnit {
            unit,
            operation: "restock".to_string(),
        });
    }
    validate_quantity(quantity)?;

    let counter = item.stock().get(unit);
    if counter.checked_add(quantity).map_or(true, |n| n > MAX_STOCK_COUNT) {
        return Err(ValidationError::OutOfRange {
            field: match unit {
                UnitKind::Carton => "stockCartons",
                _ => "stockRolls",
            }
            .to_string(),
            min: 0,
            max: MAX_STOCK_COUNT,
        }
        .into());
    }

    StockPlan::build(item.stock(), vec![StockMovement::Add { unit, quantity }])
}

// =============================================================================
// Unit Tests
// =============================================================================
