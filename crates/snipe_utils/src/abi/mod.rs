use ethers::contract::abigen;

abigen!(
    UniswapV2FactoryAbigen,
    r#"[
        event PairCreated(address indexed token0, address indexed token1, address pair, uint256 allPairsLength)
    ]"#
);

abigen!(
    UniswapV2Router02Abigen,
    r#"[
        function factory() external view returns (address)
        function WETH() external view returns (address)
        function swapExactETHForTokens(uint256 amountOutMin, address[] calldata path, address to, uint256 deadline) external payable returns (uint256[] memory amounts)
    ]"#
);
