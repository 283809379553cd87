// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

pub mod api_keys;
pub mod blocks;
pub mod datasets;
pub mod error;
pub mod pinboards;
pub mod pins;
pub mod users;
pub mod workflow_data;

pub use api_keys::{CreateApiKeyRequest, CreateApiKeyResponse, ListApiKeysResponse};
pub use blocks::{CreateBlockRequest, ListBlocksResponse, UpdateBlockRequest};
pub use datasets::{CreateDatasetRequest, ListDatasetsResponse, UpdateDatasetRequest};
pub use error::{CreatedResponse, ErrorResponse, SuccessResponse};
pub use pinboards::{
	AddPinRequest, CreatePinboardRequest, ListPinboardsResponse, PublicPinboardResponse,
	UpdatePinboardRequest,
};
pub use pins::{
	ListPinsQuery, ListPinsResponse, PinDetailResponse, SendPinRequest, UpdatePinRequest,
	DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
};
pub use users::UpsertUserRequest;
pub use workflow_data::{WorkflowDataListResponse, WorkflowDataResponse};
