// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

pub mod boosting;
pub mod calendar;
pub mod channels;
pub mod health;
pub mod metrics;
pub mod recommendations;
pub mod statistics;
