// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

//! The in-memory .NET metadata model the re-order engine operates on.
//!
//! Submodules cover the table rows and their collection ([`tables`]), decoded
//! signature trees ([`signatures`]), assembly identity ([`identity`]) and the
//! IL method-body model with its stack analysis ([`method`]).

pub mod identity;
pub mod method;
pub mod signatures;
pub mod tables;
