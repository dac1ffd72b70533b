//! Key names of the built-in stack template contract.
//!
//! The stack template, the stack providers, and the stack manager all
//! address parameters and outputs by these names.

/// Template parameter: artifact group coordinate.
pub const PARAM_GROUP_ID: &str = "GroupId";
/// Template parameter: artifact name coordinate.
pub const PARAM_ARTIFACT_ID: &str = "ArtifactId";
/// Template parameter: artifact version being deployed.
pub const PARAM_VERSION: &str = "Version";
/// Template parameter: target stage name.
pub const PARAM_STAGE: &str = "Stage";

/// Stack output: execution role ARN granted to the function.
pub const OUTPUT_EXECUTION_ROLE: &str = "LambdaExecutionRole";
/// Stack output: ARN of the provisioned function.
pub const OUTPUT_FUNCTION_ARN: &str = "LambdaFunctionArn";
