// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Unit tests for the TPM transport, run against a recording mock firmware.




/// Event record layout and submission.
mod event_tests;
