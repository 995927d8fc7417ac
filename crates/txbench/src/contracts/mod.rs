//! Contract interfaces and compiled artifacts used by the token workloads.

mod artifact;
pub use artifact::{ArtifactError, ContractArtifact};

use alloy_sol_types::sol;

sol! {
    /// ERC20 token deployed for the token-transfer workload.
    interface IBenchToken {
        /// Returns the token balance of `account`.
        function balanceOf(address account) external view returns (uint256);

        /// Moves `amount` tokens from the caller to `to`.
        function transfer(address to, uint256 amount) external returns (bool);
    }
}

sol! {
    /// ERC721 collection deployed for the NFT-mint workload.
    interface IBenchNft {
        /// Mints a token with the given metadata URI to the caller.
        function createNFT(string tokenURI) external returns (uint256);
    }
}
