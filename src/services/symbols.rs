// CLASSIFICATION: COMMUNITY
// Filename: symbols.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

/// Resolves guest addresses against loaded module symbols.
pub trait SymbolResolver: Send + Sync {
    /// Find the closest symbol at or below `address`.
    ///
    /// On success writes the distance from the symbol and NUL-terminated
    /// symbol and module names into the caller's buffers. Must not allocate.
    fn find_closest_symbol(
        &self,
        address: u32,
        distance: &mut u32,
        symbol_name: &mut [u8],
        module_name: &mut [u8],
    ) -> bool;
}
