//! Built-in performance engines (osu! rosu-pp).

mod rosu;

pub use rosu::RosuEngine;
