//! Carts and the factory that issues them.

use cartage_core::{CartId, LocationId};

/// One vehicle in the fleet.
///
/// Mutated only by its owning driver agent; everyone else works from
/// snapshots.  Invariant at rest: `payload <= capacity`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cart {
    pub id: CartId,
    /// Maximum number of items the cart can carry.
    pub capacity: u32,
    /// Where the cart last reported being.  Updated hop by hop while driving.
    pub last_known_location: LocationId,
    /// Items currently on board.
    pub payload: u32,
}

/// Issues carts with sequential ids.
#[derive(Default)]
pub struct CartFactory {
    next_id: u32,
}

impl CartFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty cart at `location`.
    pub fn cart(&mut self, capacity: u32, location: LocationId) -> Cart {
        self.cart_with_payload(capacity, location, 0)
    }

    /// A cart already carrying `payload` items.
    ///
    /// # Panics
    /// Panics in debug mode if `payload > capacity`.
    pub fn cart_with_payload(&mut self, capacity: u32, location: LocationId, payload: u32) -> Cart {
        debug_assert!(payload <= capacity, "payload must not exceed capacity");
        let id = CartId(self.next_id);
        self.next_id += 1;
        Cart { id, capacity, last_known_location: location, payload }
    }
}
