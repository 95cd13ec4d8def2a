// Copyright 2026 The Chatpipe Project
// SPDX-License-Identifier: Apache-2.0

pub mod backend;
pub mod config;
pub mod frame;
pub mod message;
pub mod render;
pub mod session;
pub mod store;
pub mod stream;
