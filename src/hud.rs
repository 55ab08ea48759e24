//! Inventory display
//!
//! The HUD never reads the stage directly; it only hears about inventory
//! changes through [`GameEvent::InventoryChanged`](crate::sim::GameEvent).

use crate::sim::Inventory;

/// Something that shows the player's items
pub trait Hud {
    fn inventory_changed(&mut self, inventory: &Inventory);
}

/// Single-line text HUD
#[derive(Debug, Default)]
pub struct TextHud {
    line: String,
    updates: usize,
}

impl TextHud {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current status line
    pub fn line(&self) -> &str {
        &self.line
    }

    /// How many times the inventory was redrawn
    pub fn updates(&self) -> usize {
        self.updates
    }
}

/// Format an inventory as a compact status line
pub fn format_inventory(inv: &Inventory) -> String {
    format!(
        "gems {}/{}  keys {}  pickaxe {}  shovel {}  bombs {}",
        inv.gems, inv.max_gems, inv.keys, inv.pickaxe, inv.shovel, inv.bombs
    )
}

impl Hud for TextHud {
    fn inventory_changed(&mut self, inventory: &Inventory) {
        self.line = format_inventory(inventory);
        self.updates += 1;
        log::trace!("HUD: {}", self.line);
    }
}
