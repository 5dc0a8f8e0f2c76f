// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod drivers;
pub mod trucks;
pub mod freights;
pub mod advances;
pub mod fuel;
pub mod settlements;
pub mod reports;
pub mod exporter;
pub mod doctor;
pub mod config;
