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

//! Assembly identity: the canonical textual assembly-name form and its parts.
//!
//! Implements the display-name grammar
//! `Name, Version=M.m.b.r[, Culture=c][, PublicKeyToken=hex|PublicKey=hex]`
//! from ECMA-335 II.6. Parsing is speculative-friendly: a malformed name
//! produces a structured [`crate::Error::Malformed`] without touching any
//! shared state, so callers can probe candidate strings freely.

use std::{fmt, fmt::Write as _, str::FromStr};

use crate::{Error, Result};

/// Four-part assembly version number (II.6.2.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct AssemblyVersion {
    /// Major version - significant, potentially breaking changes
    pub major: u16,
    /// Minor version - backward compatible feature additions
    pub minor: u16,
    /// Build number
    pub build: u16,
    /// Revision number
    pub revision: u16,
}

impl AssemblyVersion {
    /// Creates a version from its four components.
    #[must_use]
    pub fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        AssemblyVersion {
            major,
            minor,
            build,
            revision,
        }
    }

    /// Parses a dotted version string with one to four components.
    ///
    /// Missing components default to zero, matching runtime binder behavior.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] when the string is empty, has more than
    /// four components, or a component is not a decimal `u16`.
    pub fn parse(version_str: &str) -> Result<Self> {
        let parts: Vec<&str> = version_str.split('.').collect();

        if version_str.is_empty() || parts.len() > 4 {
            return Err(malformed_error!("Invalid version format: {}", version_str));
        }

        let mut components = [0u16; 4];
        for (i, part) in parts.iter().enumerate() {
            components[i] = part
                .parse::<u16>()
                .map_err(|_| malformed_error!("Invalid version component: {}", part))?;
        }

        Ok(Self::new(
            components[0],
            components[1],
            components[2],
            components[3],
        ))
    }
}

impl fmt::Display for AssemblyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

impl FromStr for AssemblyVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Strong-name component of an assembly identity (II.6.2.1.3).
///
/// Either the full public key or its 8-byte token. Rendered as
/// `PublicKey=hex` or `PublicKeyToken=hex` respectively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StrongName {
    /// The 8-byte public key token, in display order.
    Token([u8; 8]),
    /// The full public key blob.
    Key(Vec<u8>),
}

/// Complete assembly identification: name, version, culture and strong name.
///
/// Culture-neutral assemblies carry `culture: None`; the textual forms
/// `Culture=neutral` and an absent `Culture=` part both map to `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssemblyIdentity {
    /// The simple assembly name (e.g. `mscorlib`).
    pub name: String,
    /// Four-part version number.
    pub version: AssemblyVersion,
    /// Localization culture; `None` for culture-neutral assemblies.
    pub culture: Option<String>,
    /// Strong-name public key or token; `None` for unsigned assemblies.
    pub strong_name: Option<StrongName>,
}

impl AssemblyIdentity {
    /// Creates an identity from its parts.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        version: AssemblyVersion,
        culture: Option<String>,
        strong_name: Option<StrongName>,
    ) -> Self {
        AssemblyIdentity {
            name: name.into(),
            version,
            culture,
            strong_name,
        }
    }

    /// Parses the canonical display-name form.
    ///
    /// Recognized optional parts are `Version=`, `Culture=` (`neutral` maps to
    /// no culture) and `PublicKeyToken=` / `PublicKey=` (`null` maps to no
    /// strong name). Unrecognized parts are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Malformed`] for an empty name, an invalid version,
    /// non-hex key material, or a token that is not exactly 8 bytes.
    pub fn parse(display_name: &str) -> Result<Self> {
        let parts: Vec<&str> = display_name.split(',').map(str::trim).collect();

        let name = parts[0].to_string();
        if name.is_empty() {
            return Err(malformed_error!("Assembly name cannot be empty"));
        }

        let mut version = AssemblyVersion::default();
        let mut culture = None;
        let mut strong_name = None;

        for part in parts.iter().skip(1) {
            if let Some(value) = part.strip_prefix("Version=") {
                version = AssemblyVersion::parse(value)?;
            } else if let Some(value) = part.strip_prefix("Culture=") {
                if value != "neutral" && !value.is_empty() {
                    culture = Some(value.to_string());
                }
            } else if let Some(value) = part.strip_prefix("PublicKeyToken=") {
                if value != "null" && !value.is_empty() {
                    let token_bytes = hex::decode(value).map_err(|e| {
                        malformed_error!("Invalid hex in PublicKeyToken '{}': {}", value, e)
                    })?;
                    if token_bytes.len() != 8 {
                        return Err(malformed_error!(
                            "PublicKeyToken must be exactly 8 bytes (16 hex characters), got {} bytes from '{}'",
                            token_bytes.len(),
                            value
                        ));
                    }
                    let mut token = [0u8; 8];
                    token.copy_from_slice(&token_bytes);
                    strong_name = Some(StrongName::Token(token));
                }
            } else if let Some(value) = part.strip_prefix("PublicKey=") {
                if value != "null" && !value.is_empty() {
                    let key = hex::decode(value).map_err(|e| {
                        malformed_error!("Invalid hex in PublicKey '{}': {}", value, e)
                    })?;
                    strong_name = Some(StrongName::Key(key));
                }
            } else {
                return Err(malformed_error!(
                    "Unrecognized assembly name component: '{}'",
                    part
                ));
            }
        }

        Ok(AssemblyIdentity {
            name,
            version,
            culture,
            strong_name,
        })
    }

    /// Renders the canonical display-name form.
    ///
    /// The name and version are always present; culture and strong name are
    /// appended only when set.
    #[must_use]
    pub fn display_name(&self) -> String {
        let mut out = format!("{}, Version={}", self.name, self.version);

        if let Some(culture) = &self.culture {
            let _ = write!(out, ", Culture={culture}");
        }

        match &self.strong_name {
            Some(StrongName::Token(token)) => {
                out.push_str(", PublicKeyToken=");
                for byte in token {
                    let _ = write!(out, "{byte:02x}");
                }
            }
            Some(StrongName::Key(key)) => {
                out.push_str(", PublicKey=");
                for byte in key {
                    let _ = write!(out, "{byte:02x}");
                }
            }
            None => {}
        }

        out
    }
}

impl fmt::Display for AssemblyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

impl FromStr for AssemblyIdentity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
