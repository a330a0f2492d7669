// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod decision_client;
pub mod claim_mapper;
pub mod filter_factory;

pub use claim_mapper::ClaimMapper;
pub use decision_client::DecisionClient;
