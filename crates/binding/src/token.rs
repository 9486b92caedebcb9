//! ERC20 token contract bindings.
//!
//! Only the calls the token client issues plus the metadata views and events
//! a standard token exposes. Parameter names follow the canonical ERC20
//! interface so decoded events read naturally.

use alloy_sol_types::sol;

sol! {
    /// Standard ERC20 token interface.
    #[sol(rpc)]
    interface IERC20 {
        /// Emitted when tokens move between accounts, including mints and burns.
        event Transfer(address indexed from, address indexed to, uint256 value);

        /// Emitted when `owner` sets the allowance of `spender`.
        event Approval(address indexed owner, address indexed spender, uint256 value);

        function balanceOf(address owner) external view returns (uint256);

        function allowance(address owner, address spender) external view returns (uint256);

        function totalSupply() external view returns (uint256);

        /// Set the allowance of `spender` over the caller's tokens.
        function approve(address spender, uint256 value) external returns (bool);

        /// Move `value` tokens from the caller to `to`.
        function transfer(address to, uint256 value) external returns (bool);

        /// Move `value` tokens from `from` to `to` using the caller's allowance.
        function transferFrom(address from, address to, uint256 value) external returns (bool);

        function name() external view returns (string memory);

        function symbol() external view returns (string memory);

        function decimals() external view returns (uint8);
    }
}
