//! Engine behavior tests, grouped by concern.

use super::test_helpers::*;
use super::*;
