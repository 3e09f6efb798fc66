// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

pub mod count;
pub mod find;
pub mod list;
pub mod meta;
pub mod stat;

pub use count::count_command;
pub use find::find_command;
pub use list::{ListArgs, list_command};
pub use meta::meta_command;
pub use stat::stat_command;
