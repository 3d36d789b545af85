//! Controller behaviour tests.
//!
//! Run headless: the Controller has no GTK dependency, so everything
//! here exercises it directly with synthetic key events.
