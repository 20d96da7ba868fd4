// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Black-box specs for the `punchd` binary.
//!
//! The test files live under `daemon/` and are compiled as integration tests
//! of the `punchd` crate (see its `[[test]]` entries), which gives them
//! access to the built binary.
