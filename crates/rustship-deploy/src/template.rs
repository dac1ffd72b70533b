//! Built-in CloudFormation template.
//!
//! The deployer targets exactly one fixed topology: an execution role
//! and a Lambda function, managed as one stack. The template is not
//! configurable; the deployment only parameterizes it with the artifact
//! coordinates and stage.

use rustship_core::{Deployment, contract};
use rustship_provider::StackParameter;

/// Render the template body as JSON.
#[must_use]
pub fn template_body() -> String {
    serde_json::json!({
        "AWSTemplateFormatVersion": "2010-09-09",
        "Description": "RustShip managed function stack",
        "Parameters": {
            "GroupId": { "Type": "String" },
            "ArtifactId": { "Type": "String" },
            "Version": { "Type": "String" },
            "Stage": { "Type": "String" }
        },
        "Resources": {
            "LambdaExecutionRole": {
                "Type": "AWS::IAM::Role",
                "Properties": {
                    "AssumeRolePolicyDocument": {
                        "Version": "2012-10-17",
                        "Statement": [{
                            "Effect": "Allow",
                            "Principal": { "Service": ["lambda.amazonaws.com", "apigateway.amazonaws.com"] },
                            "Action": "sts:AssumeRole"
                        }]
                    },
                    "ManagedPolicyArns": [
                        "arn:aws:iam::aws:policy/service-role/AWSLambdaBasicExecutionRole"
                    ],
                    "Policies": [{
                        "PolicyName": "allow-lambda-invoke",
                        "PolicyDocument": {
                            "Version": "2012-10-17",
                            "Statement": [{
                                "Effect": "Allow",
                                "Action": "lambda:InvokeFunction",
                                "Resource": "*"
                            }]
                        }
                    }]
                }
            },
            "LambdaFunction": {
                "Type": "AWS::Lambda::Function",
                "Properties": {
                    "FunctionName": { "Ref": "ArtifactId" },
                    "Handler": "bootstrap",
                    "Runtime": "provided.al2023",
                    "Role": { "Fn::GetAtt": ["LambdaExecutionRole", "Arn"] },
                    "Code": {
                        "S3Bucket": { "Fn::Sub": "${GroupId}-deployments" },
                        "S3Key": { "Fn::Sub": "${ArtifactId}/${Version}/${ArtifactId}.zip" }
                    },
                    "Tags": [
                        { "Key": "rustship:stage", "Value": { "Ref": "Stage" } },
                        { "Key": "rustship:version", "Value": { "Ref": "Version" } }
                    ]
                }
            }
        },
        "Outputs": {
            "LambdaExecutionRole": {
                "Description": "Execution role granted to the function",
                "Value": { "Fn::GetAtt": ["LambdaExecutionRole", "Arn"] }
            },
            "LambdaFunctionArn": {
                "Description": "ARN of the managed function",
                "Value": { "Fn::GetAtt": ["LambdaFunction", "Arn"] }
            }
        }
    })
    .to_string()
}

/// Build the parameter list for a deployment.
#[must_use]
pub fn parameters(deployment: &Deployment) -> Vec<StackParameter> {
    vec![
        StackParameter::new(contract::PARAM_GROUP_ID, deployment.group_id()),
        StackParameter::new(contract::PARAM_ARTIFACT_ID, deployment.artifact_id()),
        StackParameter::new(contract::PARAM_VERSION, deployment.version()),
        StackParameter::new(contract::PARAM_STAGE, deployment.stage()),
    ]
}
