use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::Holding;

/// (particulars, symbol, sector, purchase price, quantity)
const SEED: [(&str, &str, &str, Decimal, Decimal); 6] = [
    ("HDFC Bank", "HDFCBANK", "Financial", dec!(1500), dec!(10)),
    ("Bajaj Finance", "BAJFINANCE", "Financial", dec!(7000), dec!(5)),
    ("ICICI Bank", "ICICIBANK", "Financial", dec!(900), dec!(15)),
    ("Affle India", "AFFLE", "Technology", dec!(1200), dec!(20)),
    ("Infosys", "INFY", "Technology", dec!(1400), dec!(25)),
    ("Tata Consultancy Services", "TCS", "Technology", dec!(3500), dec!(8)),
];

/// Holdings used when no seed file is configured. Ids are stable ("1".."6").
pub fn default_holdings() -> Vec<Holding> {
    SEED.iter()
        .enumerate()
        .map(|(i, (name, symbol, sector, price, qty))| {
            let mut holding = Holding::new(*name, *symbol, *sector, *price, *qty);
            holding.id = (i + 1).to_string();
            holding
        })
        .collect()
}
