// Process and system I/O
pub mod dbus; // Sleep/resume and clock change monitoring
pub mod lock; // Single-instance lock file
pub mod signals; // Unix signal handling
