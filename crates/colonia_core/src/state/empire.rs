use std::io;

use crate::buffer::Buffer;

pub const EMPIRE_CITY_DATA_SIZE: usize = 2706;

const RESOURCE_COUNT: usize = 16;
const TRADE_ROUTE_SLOTS: usize = 320;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TradePrice {
    pub buy: i32,
    pub sell: i32,
}

/// Empire map view, trade cities and the per-route trading ledgers.
#[derive(Debug, Clone, PartialEq)]
pub struct EmpireState {
    pub scroll_x: i32,
    pub scroll_y: i32,
    pub selected_object: i32,
    pub cities: Vec<u8>,
    pub trade_prices: [TradePrice; RESOURCE_COUNT],
    pub trade_route_limit: Vec<i32>,
    pub trade_route_traded: Vec<i32>,
}

impl Default for EmpireState {
    fn default() -> Self {
        Self {
            scroll_x: 0,
            scroll_y: 0,
            selected_object: 0,
            cities: vec![0; EMPIRE_CITY_DATA_SIZE],
            trade_prices: [TradePrice::default(); RESOURCE_COUNT],
            trade_route_limit: vec![0; TRADE_ROUTE_SLOTS],
            trade_route_traded: vec![0; TRADE_ROUTE_SLOTS],
        }
    }
}

impl EmpireState {
    pub fn load_state(&mut self, buf: &mut Buffer) -> io::Result<()> {
        self.scroll_x = buf.read_i32()?;
        self.scroll_y = buf.read_i32()?;
        self.selected_object = buf.read_i32()?;
        Ok(())
    }

    pub fn save_state(&self, buf: &mut Buffer) -> io::Result<()> {
        buf.write_i32(self.scroll_x)?;
        buf.write_i32(self.scroll_y)?;
        buf.write_i32(self.selected_object)
    }

    pub fn load_city_state(&mut self, buf: &mut Buffer) -> io::Result<()> {
        buf.read_raw(&mut self.cities)
    }

    pub fn save_city_state(&self, buf: &mut Buffer) -> io::Result<()> {
        buf.write_raw(&self.cities)
    }

    pub fn load_trade_price_state(&mut self, buf: &mut Buffer) -> io::Result<()> {
        for price in &mut self.trade_prices {
            price.buy = buf.read_i32()?;
            price.sell = buf.read_i32()?;
        }
        Ok(())
    }

    pub fn save_trade_price_state(&self, buf: &mut Buffer) -> io::Result<()> {
        for price in &self.trade_prices {
            buf.write_i32(price.buy)?;
            buf.write_i32(price.sell)?;
        }
        Ok(())
    }

    pub fn load_trade_route_state(
        &mut self,
        limit: &mut Buffer,
        traded: &mut Buffer,
    ) -> io::Result<()> {
        for value in &mut self.trade_route_limit {
            *value = limit.read_i32()?;
        }
        for value in &mut self.trade_route_traded {
            *value = traded.read_i32()?;
        }
        Ok(())
    }

    pub fn save_trade_route_state(
        &self,
        limit: &mut Buffer,
        traded: &mut Buffer,
    ) -> io::Result<()> {
        for &value in &self.trade_route_limit {
            limit.write_i32(value)?;
        }
        for &value in &self.trade_route_traded {
            traded.write_i32(value)?;
        }
        Ok(())
    }
}
