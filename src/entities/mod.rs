pub mod inventory_movements;
pub mod motorcycles;
pub mod sales;
