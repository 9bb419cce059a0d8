// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
pub mod ops;
pub mod presets;
pub mod sessions;
pub mod stream;
