use alloy::{
    dyn_abi::Specifier,
    json_abi::{self, Function},
    primitives::{keccak256, Selector},
};

use super::{abi::AbiType, error::EncodeError};

/// First 4 bytes of keccak256 over the canonical signature,
/// e.g. `tokenOfOwnerByIndex(address,uint256)`.
pub fn derive_selector(signature: &str) -> Selector {
    Selector::from_slice(&keccak256(signature.as_bytes())[..4])
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: AbiType,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: AbiType) -> Self {
        Self { name: name.into(), ty }
    }
}

/// A function's name, inputs and outputs. The selector is derived once at
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    name: String,
    inputs: Vec<Param>,
    outputs: Vec<Param>,
    selector: Selector,
}

impl FunctionSignature {
    pub fn new(name: impl Into<String>, inputs: Vec<Param>, outputs: Vec<Param>) -> Self {
        let name = name.into();
        let selector = derive_selector(&canonical(&name, &inputs));
        Self {
            name,
            inputs,
            outputs,
            selector,
        }
    }

    /// Parses a human readable signature. Parameter names, data locations,
    /// visibility and mutability are accepted:
    ///
    /// ```
    /// # use abi_multicall::multicall::selector::FunctionSignature;
    /// let sig = FunctionSignature::parse(
    ///     "function tokenOfOwnerByIndex(address owner, uint256 index) view returns (uint256)",
    /// )
    /// .unwrap();
    /// assert_eq!(sig.canonical(), "tokenOfOwnerByIndex(address,uint256)");
    /// ```
    pub fn parse(s: &str) -> Result<Self, EncodeError> {
        let function = Function::parse(s)
            .map_err(|_| EncodeError::InvalidType(s.to_string()))?;
        let inputs = convert_params(function.inputs)?;
        let outputs = convert_params(function.outputs)?;
        Ok(Self::new(function.name, inputs, outputs))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[Param] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Param] {
        &self.outputs
    }

    pub fn selector(&self) -> Selector {
        self.selector
    }

    pub fn input_types(&self) -> Vec<AbiType> {
        self.inputs.iter().map(|param| param.ty.clone()).collect()
    }

    pub fn output_types(&self) -> Vec<AbiType> {
        self.outputs.iter().map(|param| param.ty.clone()).collect()
    }

    /// `name(type1,type2,...)`, the string the selector is hashed from.
    pub fn canonical(&self) -> String {
        canonical(&self.name, &self.inputs)
    }
}

fn canonical(name: &str, inputs: &[Param]) -> String {
    let types: Vec<String> = inputs.iter().map(|param| param.ty.to_string()).collect();
    format!("{name}({})", types.join(","))
}

fn convert_params(params: Vec<json_abi::Param>) -> Result<Vec<Param>, EncodeError> {
    params
        .into_iter()
        .map(|param| {
            let ty = param
                .resolve()
                .map_err(|_| EncodeError::InvalidType(param.ty.clone()))?;
            Ok(Param::new(param.name, ty.try_into()?))
        })
        .collect()
}
