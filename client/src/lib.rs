// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
//! Task tracker client: talks to the task backend, keeps the session token in
//! local storage and exposes everything the terminal UI needs to draw.
pub mod api;
pub mod config;
pub mod controller;
pub mod form;
pub mod session;
pub mod status;
pub mod storage;
pub mod view;
