// SPDX-License-Identifier: Apache-2.0

//! Compile-time configuration validation
//!
//! Integer and float storage widths are selected by mutually exclusive
//! features.

#[cfg(not(any(feature = "int32", feature = "int64")))]
compile_error!("No integer width features selected: choose one of 'int32' or 'int64'");

#[cfg(all(feature = "int32", feature = "int64"))]
compile_error!(
    "Cannot enable both 'int32' and 'int64' features simultaneously: choose one integer width"
);

#[cfg(not(any(feature = "float32", feature = "float64")))]
compile_error!("No float width features selected: choose one of 'float32' or 'float64'");

#[cfg(all(feature = "float32", feature = "float64"))]
compile_error!(
    "Cannot enable both 'float32' and 'float64' features simultaneously: choose one float width"
);
