// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

mod listener;
mod xml_report;
