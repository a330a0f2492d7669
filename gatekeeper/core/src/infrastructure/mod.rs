// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod cache;
pub mod http_decision_service;
pub mod http_request;

pub use http_decision_service::HttpDecisionService;
