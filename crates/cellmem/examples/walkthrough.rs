//! cellmem walkthrough: typed heap cells and cell-backed strings.
//!
//! Demonstrates:
//!   1. Allocating typed cells and reading them back
//!   2. Building an immutable cell string and dumping its cells
//!   3. Editing a mutable cell string (append, remove, insert, search)
//!   4. Freeing a string and observing the null-handle errors that follow
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example walkthrough

use cellmem::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), CellError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mem = Memory::new();
    let heap = mem.heap();

    // ─── Typed cells ────────────────────────────────────────────

    let int_ptr = heap.allocate(width::INT)?;
    let pi_ptr = heap.allocate(width::DOUBLE)?;
    // SAFETY: both handles are live and sized for the values written.
    let (int_value, pi_value) = unsafe {
        heap.write_int32(int_ptr, 42);
        heap.write_float64(pi_ptr, 3.141592653);
        (heap.read_int32(int_ptr), heap.read_float64(pi_ptr))
    };
    info!(value = int_value, handle = %int_ptr, "int cell");
    info!(value = pi_value, handle = %pi_ptr, "double cell");
    // SAFETY: released once; neither handle is used again.
    unsafe {
        heap.free(int_ptr);
        heap.free(pi_ptr);
    }

    // ─── Immutable string ───────────────────────────────────────

    let digest = mem.cell_string("5f4dcc3b5aa765d61d8327deb882cf99")?;
    info!(len = digest.len(), text = %digest.to_text()?, "cell string");
    for cell in digest.dump().take(4) {
        info!("{cell}");
    }

    // ─── Mutable string ─────────────────────────────────────────

    let mut s = mem.mutable_cell_string("Hello, World!")?;
    s.append("Hello, World!")?;
    info!(text = %s.to_text()?, "after append");

    let removed = s.remove_at(0)?;
    info!(%removed, text = %s.to_text()?, "after remove_at(0)");

    s.insert_at('H', 0)?;
    info!(text = %s.to_text()?, "after insert_at('H', 0)");
    info!(found = s.contains("World!Hello")?, "contains \"World!Hello\"");

    // ─── Free ───────────────────────────────────────────────────

    s.free();
    match s.to_text() {
        Err(e) => warn!(error = %e, "read after free rejected"),
        Ok(text) => warn!(%text, "read after free unexpectedly succeeded"),
    }
    s.free();
    info!(state = ?s.state(), "second free was a no-op");

    Ok(())
}
