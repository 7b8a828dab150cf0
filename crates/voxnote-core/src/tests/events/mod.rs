mod typed;
