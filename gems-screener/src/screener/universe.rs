//! Curated ticker universes and per-market screening profiles.

use serde::{Deserialize, Serialize};

use crate::market::{Market, MarketSelection};

/// Small/mid-cap US listings across sectors.
pub const US_UNIVERSE: &[&str] = &[
    "APPN", "BILL", "DOCN", "FROG", "GTLB", "MNDY", "PATH", "PD",
    "S", "TENB", "TOST", "U", "ASAN", "BLKB", "COUP", "FRSH",
    "NCNO", "PCOR", "SMAR", "WK", "CYBR", "FFIV", "RPD", "SAIL",
    "VRNS", "ALRM", "QLYS", "RBRK", "PING", "EVBG", "ALGM", "CRUS",
    "DIOD", "LITE", "MTSI", "NVTS", "PLAB", "SMTC", "WOLF", "CEVA",
    "ACAD", "ALKS", "ARVN", "BEAM", "BGNE", "BLUE", "CRSP", "EDIT",
    "FOLD", "IONS", "KRYS", "LEGN", "NTLA", "RARE", "SAGE", "SRPT",
    "UTHR", "VRTX", "XENE", "YMAB", "AXNX", "DXCM", "GMED", "HOLX",
    "ICUI", "ISRG", "LMAT", "NVST", "NVCR", "PODD", "STAA", "TMDX",
    "VCYT", "IRTC", "ATRC", "OMCL", "OFIX", "ATEC", "NEOG", "NARI",
    "ACHC", "AMED", "CRVL", "ENSG", "HCAT", "PDCO", "PINC", "RDNT",
    "SEM", "THC", "AVAV", "HWM", "KTOS", "LDOS", "NPK", "SPR",
    "TGI", "TXT", "WWD", "ATRO", "AIT", "ATKR", "BMI", "CR",
    "FLS", "GGG", "GNRC", "ITT", "PRIM", "RBC", "ROP", "TTEK",
    "UFPI", "WSO", "AGCO", "ALG", "BECN", "CMCO", "EXPO", "MLI",
    "BOOT", "BURL", "FIVE", "GES", "LCII", "OLLI", "PRPL", "RVLV",
    "SCVL", "UPBD", "W", "WRBY", "ANF", "BBWI", "DKS", "FL",
    "LAD", "SIG", "TSCO", "BLMN", "CAKE", "CBRL", "CHUY", "DENN",
    "DIN", "PLAY", "RRGB", "RUTH", "TXRH", "WEN", "WING", "BJRI",
    "BROS", "CAVA", "CMG", "DNUT", "JACK", "LOCO", "SHAK", "ABCB",
    "BANR", "CADE", "CASH", "CBSH", "CVBF", "EWBC", "FBK", "FFIN",
    "FHN", "GBCI", "HBAN", "HOMB", "IBOC", "ONB", "OZK", "PPBI",
    "SFNC", "SNV", "UBSI", "AFRM", "COIN", "FOUR", "LC", "LU",
    "MKTX", "SOFI", "UPST", "VIRT", "NU", "ACGL", "AFG", "AXS",
    "BRO", "ESGR", "KNSL", "PRI", "RLI", "RYAN", "WRB", "AROC",
    "CLB", "FLNG", "FTI", "HP", "LBRT", "NBR", "NE", "PTEN",
    "RIG", "ARRY", "ENPH", "FSLR", "NOVA", "RUN", "SEDG", "SHLS",
    "PLUG", "BE", "CHPT", "ALB", "ASIX", "CE", "FUL", "HUN",
    "MEOH", "NEU", "OLN", "RPM", "SXT", "TROX", "TSE", "WLK",
    "AVNT", "CGNT", "HWKN", "KRA", "BCPC", "ECL", "ESI", "AMT",
    "CCI", "DLR", "EQIX", "PLD", "PSA", "SBAC", "SPG", "WELL",
    "VTR",
];

/// NSE mid/small-cap listings.
pub const INDIA_UNIVERSE: &[&str] = &[
    "PERSISTENT.NS", "COFORGE.NS", "MPHASIS.NS", "LTTS.NS", "CYIENT.NS", "TATAELXSI.NS", "SONATSOFTW.NS", "HAPPSTMNDS.NS",
    "INTELLECT.NS", "ROUTE.NS", "ALKEM.NS", "TORNTPHARM.NS", "LALPATHLAB.NS", "METROPOLIS.NS", "THYROCARE.NS", "AUROPHARMA.NS",
    "ABBOTINDIA.NS", "GLAXO.NS", "SANOFI.NS", "PFIZER.NS", "IPCALAB.NS", "LAURUSLABS.NS", "GLAND.NS", "NATCOPHARMA.NS",
    "STAR.NS", "MOTHERSON.NS", "BOSCHLTD.NS", "EXIDEIND.NS", "BALKRISIND.NS", "MRF.NS", "APOLLOTYRE.NS", "CEATLTD.NS",
    "ENDURANCE.NS", "SCHAEFFLER.NS", "SKFINDIA.NS", "AARTI.NS", "DEEPAKNTR.NS", "SRF.NS", "NAVINFLUOR.NS", "ATUL.NS",
    "PIIND.NS", "GNFC.NS", "FLUOROCHEM.NS", "TATACHEM.NS", "BASF.NS", "TRENT.NS", "JUBLFOOD.NS", "RELAXO.NS",
    "PAGEIND.NS", "BATAIND.NS", "VMART.NS", "WESTLIFE.NS", "SAPPHIRE.NS", "RAYMOND.NS", "TITAN.NS", "CUMMINSIND.NS",
    "THERMAX.NS", "ABB.NS", "SIEMENS.NS", "VOLTAS.NS", "HAVELLS.NS", "CROMPTON.NS", "POLYCAB.NS", "KEI.NS",
    "KALPATPOWR.NS", "CHOLAFIN.NS", "SRTRANSFIN.NS", "MUTHOOTFIN.NS", "MANAPPURAM.NS", "ICICIGI.NS", "SBICARD.NS", "BAJFINANCE.NS",
    "BAJAJFINSV.NS", "HDFCLIFE.NS", "SBILIFE.NS", "RAMCOCEM.NS", "JKCEMENT.NS", "HEIDELBERG.NS", "STARCEMENT.NS", "NUVOCO.NS",
    "NCC.NS", "IRCON.NS", "NBCC.NS", "ASHOKLEY.NS", "GRINDWELL.NS", "APL.NS", "JINDALSTEL.NS", "SAIL.NS",
    "NMDC.NS", "HINDZINC.NS", "VEDL.NS", "NATIONALUM.NS", "HINDALCO.NS", "RATNAMANI.NS", "WELCORP.NS", "AFFLE.NS",
    "GOKEX.NS", "VARDHACRLC.NS", "SPANDANA.NS", "KPRMILL.NS", "TRIDENT.NS", "WELSPUNIND.NS", "GRASIM.NS", "RTNPOWER.NS",
    "CENTURYPLY.NS",
];

/// Universe, liquidity bounds and benchmark for one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketProfile {
    pub selection: MarketSelection,
    pub universe: Vec<String>,
    /// Inclusive market-cap bounds (local currency)
    pub market_cap_min: f64,
    pub market_cap_max: f64,
    /// Minimum trailing 20-bar average volume (shares)
    pub min_avg_volume: f64,
    /// Index used for the regime check and relative strength
    pub benchmark: String,
    /// Default report file stem
    pub output_stem: String,
}

impl MarketProfile {
    pub fn us() -> Self {
        Self {
            selection: MarketSelection::Us,
            universe: to_owned(US_UNIVERSE),
            market_cap_min: 300_000_000.0,
            market_cap_max: 10_000_000_000.0,
            min_avg_volume: 500_000.0,
            benchmark: "SPY".into(),
            output_stem: "stock_picks".into(),
        }
    }

    pub fn india() -> Self {
        Self {
            selection: MarketSelection::India,
            universe: to_owned(INDIA_UNIVERSE),
            market_cap_min: 1_000_000_000.0,
            market_cap_max: 100_000_000_000.0,
            min_avg_volume: 50_000.0,
            benchmark: "^NSEI".into(),
            output_stem: "stock_picks_india".into(),
        }
    }

    /// Both universes with the widest cap range and the lower volume floor.
    pub fn both() -> Self {
        let us = Self::us();
        let india = Self::india();
        let mut universe = us.universe;
        universe.extend(india.universe);
        Self {
            selection: MarketSelection::Both,
            universe,
            market_cap_min: us.market_cap_min.min(india.market_cap_min),
            market_cap_max: us.market_cap_max.max(india.market_cap_max),
            min_avg_volume: us.min_avg_volume.min(india.min_avg_volume),
            benchmark: "SPY".into(),
            output_stem: "stock_picks_combined".into(),
        }
    }

    pub fn for_selection(selection: MarketSelection) -> Self {
        match selection {
            MarketSelection::Us => Self::us(),
            MarketSelection::India => Self::india(),
            MarketSelection::Both => Self::both(),
        }
    }

    /// Market whose threshold set applies to `ticker`.
    pub fn market_for(&self, ticker: &str) -> Market {
        self.selection.market_for(ticker)
    }
}

fn to_owned(tickers: &[&str]) -> Vec<String> {
    tickers.iter().map(|t| t.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_universes_have_no_duplicates() {
        for universe in [US_UNIVERSE, INDIA_UNIVERSE] {
            let unique: HashSet<_> = universe.iter().collect();
            assert_eq!(unique.len(), universe.len());
        }
    }

    #[test]
    fn test_india_universe_uses_exchange_suffix() {
        assert!(INDIA_UNIVERSE
            .iter()
            .all(|t| Market::from_ticker(t) == Market::India));
        assert!(US_UNIVERSE.iter().all(|t| Market::from_ticker(t) == Market::Us));
    }

    #[test]
    fn test_both_profile_is_widest() {
        let both = MarketProfile::both();
        assert_eq!(both.market_cap_min, 300_000_000.0);
        assert_eq!(both.market_cap_max, 100_000_000_000.0);
        assert_eq!(both.min_avg_volume, 50_000.0);
        assert_eq!(both.benchmark, "SPY");
        assert_eq!(both.universe.len(), US_UNIVERSE.len() + INDIA_UNIVERSE.len());
        assert_eq!(both.market_for("TRENT.NS"), Market::India);
    }

    #[test]
    fn test_india_profile() {
        let india = MarketProfile::for_selection(MarketSelection::India);
        assert_eq!(india.benchmark, "^NSEI");
        assert_eq!(india.min_avg_volume, 50_000.0);
    }
}
