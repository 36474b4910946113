//-
// Copyright (c) 2025, the Mailward authors
//
// This file is part of Mailward.
//
// Mailward is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// Mailward is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along
// with Mailward. If not, see <http://www.gnu.org/licenses/>.

//! The per-message forwarding decision engine and the transport seam it
//! drives.

pub mod engine;
pub mod model;
pub mod transport;
